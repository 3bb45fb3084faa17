// src/services/cart_service.rs
//
// Carrinho: um por utilizador, linhas com snapshot de nome/preço tirado
// no momento do add. O total é SEMPRE recalculado a partir dos subtotais
// das linhas, nunca confiado ao input.
use crate::{
    error::{AppError, AppResult},
    models::cart::{Cart, CartItem, CartView},
    models::menu_item::MenuItem,
};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

pub const MAX_QUANTITY_PER_ITEM: i64 = 10;

/// Devolve o carrinho do utilizador, criando um vazio se não existir.
pub async fn get_or_create_cart(db_pool: &SqlitePool, user_id: &str) -> AppResult<CartView> {
    let mut tx = db_pool.begin().await?;
    let cart = ensure_cart(&mut tx, user_id).await?;
    tx.commit().await?;
    load_view(db_pool, &cart).await
}

/// Adiciona um item ao carrinho (ou soma à linha existente).
pub async fn add_item(
    db_pool: &SqlitePool,
    user_id: &str,
    menu_item_id: &str,
    quantity: i64,
) -> AppResult<CartView> {
    if !(1..=MAX_QUANTITY_PER_ITEM).contains(&quantity) {
        return Err(AppError::Validation(
            "Quantity must be between 1 and 10".to_string(),
        ));
    }

    let mut tx = db_pool.begin().await?;

    // O item tem de existir e estar disponível no momento do add
    let menu_item = sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE id = ?1")
        .bind(menu_item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;

    if !menu_item.is_available {
        return Err(AppError::Conflict(
            "This item is currently unavailable".to_string(),
        ));
    }

    let cart = ensure_cart(&mut tx, user_id).await?;

    let existing_qty: Option<i64> = sqlx::query_scalar(
        "SELECT quantity FROM cart_items WHERE cart_id = ?1 AND menu_item_id = ?2",
    )
    .bind(&cart.id)
    .bind(menu_item_id)
    .fetch_optional(&mut *tx)
    .await?;

    match existing_qty {
        Some(current) => {
            // Linha já existe: somar quantidades, respeitando o teto de 10
            let new_quantity = current + quantity;
            if new_quantity > MAX_QUANTITY_PER_ITEM {
                tracing::debug!(
                    "Merge rejeitado para '{}': {} + {} > {}",
                    menu_item.name, current, quantity, MAX_QUANTITY_PER_ITEM
                );
                return Err(AppError::Validation(
                    "Maximum quantity per item is 10".to_string(),
                ));
            }
            // O preço da linha NÃO é relido do catálogo aqui: o subtotal
            // usa o snapshot guardado no add original
            sqlx::query(
                "UPDATE cart_items SET quantity = ?1, subtotal = ?1 * price \
                 WHERE cart_id = ?2 AND menu_item_id = ?3",
            )
            .bind(new_quantity)
            .bind(&cart.id)
            .bind(menu_item_id)
            .execute(&mut *tx)
            .await?;
        }
        None => {
            // Linha nova: snapshot do nome e preço ATUAIS do catálogo
            sqlx::query(
                "INSERT INTO cart_items (cart_id, menu_item_id, name, price, quantity, subtotal) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?4 * ?5)",
            )
            .bind(&cart.id)
            .bind(menu_item_id)
            .bind(&menu_item.name)
            .bind(menu_item.price)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }
    }

    recompute_total(&mut tx, &cart.id).await?;
    tx.commit().await?;

    tracing::debug!("Item '{}' adicionado ao carrinho de {}", menu_item.name, user_id);
    load_view_by_id(db_pool, &cart.id, user_id).await
}

/// Altera a quantidade de uma linha; 0 remove a linha.
/// O preço guardado fica como está (snapshot do add, comportamento literal).
pub async fn update_item_quantity(
    db_pool: &SqlitePool,
    user_id: &str,
    menu_item_id: &str,
    quantity: i64,
) -> AppResult<CartView> {
    if !(0..=MAX_QUANTITY_PER_ITEM).contains(&quantity) {
        return Err(AppError::Validation(
            "Quantity must be between 0 and 10".to_string(),
        ));
    }

    let mut tx = db_pool.begin().await?;
    let cart = find_cart(&mut tx, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    let exists: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM cart_items WHERE cart_id = ?1 AND menu_item_id = ?2",
    )
    .bind(&cart.id)
    .bind(menu_item_id)
    .fetch_optional(&mut *tx)
    .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Item not found in cart".to_string()));
    }

    if quantity == 0 {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1 AND menu_item_id = ?2")
            .bind(&cart.id)
            .bind(menu_item_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query(
            "UPDATE cart_items SET quantity = ?1, subtotal = ?1 * price \
             WHERE cart_id = ?2 AND menu_item_id = ?3",
        )
        .bind(quantity)
        .bind(&cart.id)
        .bind(menu_item_id)
        .execute(&mut *tx)
        .await?;
    }

    recompute_total(&mut tx, &cart.id).await?;
    tx.commit().await?;
    load_view_by_id(db_pool, &cart.id, user_id).await
}

/// Remove uma linha; linha inexistente não é erro (filtro idempotente).
pub async fn remove_item(
    db_pool: &SqlitePool,
    user_id: &str,
    menu_item_id: &str,
) -> AppResult<CartView> {
    let mut tx = db_pool.begin().await?;
    let cart = find_cart(&mut tx, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1 AND menu_item_id = ?2")
        .bind(&cart.id)
        .bind(menu_item_id)
        .execute(&mut *tx)
        .await?;

    recompute_total(&mut tx, &cart.id).await?;
    tx.commit().await?;
    load_view_by_id(db_pool, &cart.id, user_id).await
}

/// Esvazia o carrinho (items=[], total=0). O carrinho em si fica.
pub async fn clear(db_pool: &SqlitePool, user_id: &str) -> AppResult<CartView> {
    let mut tx = db_pool.begin().await?;
    let cart = find_cart(&mut tx, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    clear_in_tx(&mut tx, &cart.id).await?;
    tx.commit().await?;
    load_view_by_id(db_pool, &cart.id, user_id).await
}

// --- Helpers partilhados (o order_service reusa os de transação) ---

pub(crate) async fn find_cart(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
) -> AppResult<Option<Cart>> {
    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?1")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(cart)
}

pub(crate) async fn ensure_cart(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
) -> AppResult<Cart> {
    // Dois pedidos simultâneos podem tentar criar o primeiro carrinho
    // ao mesmo tempo; o ON CONFLICT deixa o segundo reusar o existente
    // em vez de rebentar no UNIQUE de user_id.
    sqlx::query(
        "INSERT INTO carts (id, user_id, total_amount, created_at, updated_at) \
         VALUES (?1, ?2, 0, ?3, ?3) \
         ON CONFLICT(user_id) DO NOTHING",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    find_cart(tx, user_id).await?.ok_or(AppError::Internal)
}

// Recalcula o total a partir dos subtotais das linhas (invariante central).
pub(crate) async fn recompute_total(
    tx: &mut Transaction<'_, Sqlite>,
    cart_id: &str,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE carts SET \
            total_amount = (SELECT COALESCE(SUM(subtotal), 0) FROM cart_items WHERE cart_id = ?1), \
            updated_at = ?2 \
         WHERE id = ?1",
    )
    .bind(cart_id)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub(crate) async fn clear_in_tx(tx: &mut Transaction<'_, Sqlite>, cart_id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
        .bind(cart_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("UPDATE carts SET total_amount = 0, updated_at = ?1 WHERE id = ?2")
        .bind(Utc::now())
        .bind(cart_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub(crate) async fn load_items(db_pool: &SqlitePool, cart_id: &str) -> AppResult<Vec<CartItem>> {
    let items = sqlx::query_as::<_, CartItem>(
        "SELECT menu_item_id, name, price, quantity, subtotal \
         FROM cart_items WHERE cart_id = ?1 ORDER BY rowid",
    )
    .bind(cart_id)
    .fetch_all(db_pool)
    .await?;
    Ok(items)
}

async fn load_view(db_pool: &SqlitePool, cart: &Cart) -> AppResult<CartView> {
    let items = load_items(db_pool, &cart.id).await?;
    let total: f64 = sqlx::query_scalar("SELECT total_amount FROM carts WHERE id = ?1")
        .bind(&cart.id)
        .fetch_one(db_pool)
        .await?;
    Ok(CartView {
        id: cart.id.clone(),
        user_id: cart.user_id.clone(),
        items,
        total_amount: total,
    })
}

async fn load_view_by_id(db_pool: &SqlitePool, cart_id: &str, user_id: &str) -> AppResult<CartView> {
    let items = load_items(db_pool, cart_id).await?;
    let total: f64 = sqlx::query_scalar("SELECT total_amount FROM carts WHERE id = ?1")
        .bind(cart_id)
        .fetch_one(db_pool)
        .await?;
    Ok(CartView {
        id: cart_id.to_string(),
        user_id: user_id.to_string(),
        items,
        total_amount: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::services::catalog_service;

    async fn seed_item(pool: &SqlitePool, name: &str, price: f64, prep: i64) -> String {
        let category = catalog_service::create_category(pool, name, "").await.unwrap();
        let item = catalog_service::create_menu_item(
            pool,
            name,
            "descrição",
            &category.id,
            price,
            prep,
            true,
            None,
        )
        .await
        .unwrap();
        item.id
    }

    // Invariante: total == soma dos subtotais, verificado após cada mutação
    async fn assert_total_invariant(pool: &SqlitePool, cart: &CartView) {
        let sum: f64 = cart.items.iter().map(|i| i.subtotal).sum();
        assert!((cart.total_amount - sum).abs() < 1e-9);
        let stored: f64 = sqlx::query_scalar("SELECT total_amount FROM carts WHERE id = ?1")
            .bind(&cart.id)
            .fetch_one(pool)
            .await
            .unwrap();
        assert!((stored - sum).abs() < 1e-9);
    }

    #[tokio::test]
    async fn repeated_first_touch_reuses_the_same_cart() {
        let pool = test_pool().await;

        // O INSERT corre sempre; a partir do segundo toque cai no
        // ON CONFLICT e reusa a linha existente em vez de falhar
        let first = get_or_create_cart(&pool, "u-1").await.unwrap();
        let second = get_or_create_cart(&pool, "u-1").await.unwrap();
        assert_eq!(first.id, second.id);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts WHERE user_id = 'u-1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn merge_lines_sums_quantities() {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Bifana", 100.0, 10).await;

        let cart = add_item(&pool, "u-1", &item, 2).await.unwrap();
        assert_total_invariant(&pool, &cart).await;

        // Adicionar o mesmo item soma na mesma linha
        let cart = add_item(&pool, "u-1", &item, 3).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert!((cart.items[0].subtotal - 500.0).abs() < 1e-9);
        assert!((cart.total_amount - 500.0).abs() < 1e-9);
        assert_total_invariant(&pool, &cart).await;
    }

    #[tokio::test]
    async fn merge_above_ten_is_rejected_and_cart_unchanged() {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Bifana", 100.0, 10).await;

        add_item(&pool, "u-1", &item, 8).await.unwrap();
        let err = add_item(&pool, "u-1", &item, 5).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Maximum quantity per item is 10"));

        // O carrinho fica exatamente como estava
        let cart = get_or_create_cart(&pool, "u-1").await.unwrap();
        assert_eq!(cart.items[0].quantity, 8);
        assert!((cart.total_amount - 800.0).abs() < 1e-9);
        assert_total_invariant(&pool, &cart).await;
    }

    #[tokio::test]
    async fn add_rejects_out_of_range_quantity() {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Bifana", 100.0, 10).await;
        assert!(add_item(&pool, "u-1", &item, 0).await.is_err());
        assert!(add_item(&pool, "u-1", &item, 11).await.is_err());
    }

    #[tokio::test]
    async fn add_unavailable_item_conflicts() {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Bifana", 100.0, 10).await;
        catalog_service::toggle_availability(&pool, &item).await.unwrap();

        let err = add_item(&pool, "u-1", &item, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "This item is currently unavailable"));
    }

    #[tokio::test]
    async fn quantity_zero_removes_the_line() {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Bifana", 100.0, 10).await;

        add_item(&pool, "u-1", &item, 2).await.unwrap();
        let cart = update_item_quantity(&pool, "u-1", &item, 0).await.unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_amount, 0.0);
        assert_total_invariant(&pool, &cart).await;
    }

    #[tokio::test]
    async fn update_missing_line_is_not_found() {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Bifana", 100.0, 10).await;
        add_item(&pool, "u-1", &item, 1).await.unwrap();

        let err = update_item_quantity(&pool, "u-1", "inexistente", 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn remove_is_idempotent_for_missing_line() {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Bifana", 100.0, 10).await;
        add_item(&pool, "u-1", &item, 1).await.unwrap();

        // Remover linha inexistente não é erro
        let cart = remove_item(&pool, "u-1", "inexistente").await.unwrap();
        assert_eq!(cart.items.len(), 1);

        let cart = remove_item(&pool, "u-1", &item).await.unwrap();
        assert!(cart.items.is_empty());
        assert_total_invariant(&pool, &cart).await;
    }

    #[tokio::test]
    async fn price_is_frozen_at_add_time() {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Bifana", 100.0, 10).await;
        add_item(&pool, "u-1", &item, 2).await.unwrap();

        // Preço do catálogo muda depois do add
        sqlx::query("UPDATE menu_items SET price = 250 WHERE id = ?1")
            .bind(&item)
            .execute(&pool)
            .await
            .unwrap();

        // update de quantidade usa o preço congelado, não o novo
        let cart = update_item_quantity(&pool, "u-1", &item, 3).await.unwrap();
        assert!((cart.items[0].price - 100.0).abs() < 1e-9);
        assert!((cart.items[0].subtotal - 300.0).abs() < 1e-9);
        assert_total_invariant(&pool, &cart).await;
    }

    #[tokio::test]
    async fn clear_empties_but_keeps_the_cart() {
        let pool = test_pool().await;
        let item = seed_item(&pool, "Bifana", 100.0, 10).await;
        let before = add_item(&pool, "u-1", &item, 2).await.unwrap();

        let cart = clear(&pool, "u-1").await.unwrap();
        assert_eq!(cart.id, before.id);
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_amount, 0.0);
    }
}
