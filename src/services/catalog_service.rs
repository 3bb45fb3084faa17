// src/services/catalog_service.rs
//
// Catálogo: categorias e itens do menu. Leituras públicas,
// mutações reservadas ao admin (o gate é feito no middleware).
use crate::{
    error::{AppError, AppResult},
    images::StoredImage,
    models::category::Category,
    models::menu_item::{MenuItem, MenuItemRow, MenuItemView, MenuListQuery},
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const ITEM_JOIN: &str = "SELECT m.id, m.name, m.description, m.category_id, \
     c.name AS category_name, m.price, m.is_available, m.preparation_time, \
     m.image_url, m.created_at \
     FROM menu_items m JOIN categories c ON c.id = m.category_id";

// --- Leituras públicas ---

/// Lista itens do menu com filtros e paginação, ordenados por nome.
pub async fn list_menu_items(
    db_pool: &SqlitePool,
    q: &MenuListQuery,
) -> AppResult<(Vec<MenuItemView>, i64)> {
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(20).clamp(1, 100);

    let mut where_sql = String::from(" WHERE 1=1");
    if q.category.is_some() {
        where_sql.push_str(" AND m.category_id = ?");
    }
    if q.min_price.is_some() {
        where_sql.push_str(" AND m.price >= ?");
    }
    if q.max_price.is_some() {
        where_sql.push_str(" AND m.price <= ?");
    }
    if q.is_available.is_some() {
        where_sql.push_str(" AND m.is_available = ?");
    }
    if q.search.is_some() {
        where_sql.push_str(" AND (m.name LIKE ? OR m.description LIKE ?)");
    }

    let pattern = q.search.as_ref().map(|s| format!("%{s}%"));

    // Os binds têm de seguir exatamente a ordem dos '?' acima
    macro_rules! bind_filters {
        ($query:expr) => {{
            let mut query = $query;
            if let Some(category) = &q.category {
                query = query.bind(category);
            }
            if let Some(min) = q.min_price {
                query = query.bind(min);
            }
            if let Some(max) = q.max_price {
                query = query.bind(max);
            }
            if let Some(available) = q.is_available {
                query = query.bind(available);
            }
            if let Some(pattern) = &pattern {
                query = query.bind(pattern).bind(pattern);
            }
            query
        }};
    }

    let sql = format!("{ITEM_JOIN}{where_sql} ORDER BY m.name ASC LIMIT ? OFFSET ?");
    let rows = bind_filters!(sqlx::query_as::<_, MenuItemRow>(&sql))
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(db_pool)
        .await?;

    let count_sql = format!(
        "SELECT COUNT(*) FROM menu_items m JOIN categories c ON c.id = m.category_id{where_sql}"
    );
    let total = bind_filters!(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(db_pool)
        .await?;

    Ok((rows.into_iter().map(MenuItemView::from).collect(), total))
}

/// Busca um item do menu (com a categoria aninhada).
pub async fn get_menu_item(db_pool: &SqlitePool, item_id: &str) -> AppResult<MenuItemView> {
    let sql = format!("{ITEM_JOIN} WHERE m.id = ?1");
    let row = sqlx::query_as::<_, MenuItemRow>(&sql)
        .bind(item_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;
    Ok(row.into())
}

/// Lista todas as categorias, por nome.
pub async fn list_categories(db_pool: &SqlitePool) -> AppResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at FROM categories ORDER BY name ASC",
    )
    .fetch_all(db_pool)
    .await?;
    Ok(categories)
}

/// Pesquisa rápida: só itens disponíveis, no máximo 10 resultados.
pub async fn search_menu_items(db_pool: &SqlitePool, term: &str) -> AppResult<Vec<MenuItemView>> {
    let pattern = format!("%{term}%");
    let sql = format!(
        "{ITEM_JOIN} WHERE (m.name LIKE ?1 OR m.description LIKE ?1) AND m.is_available = 1 \
         ORDER BY m.name ASC LIMIT 10"
    );
    let rows = sqlx::query_as::<_, MenuItemRow>(&sql)
        .bind(&pattern)
        .fetch_all(db_pool)
        .await?;
    Ok(rows.into_iter().map(MenuItemView::from).collect())
}

// --- Mutações de Admin: itens ---

#[allow(clippy::too_many_arguments)]
pub async fn create_menu_item(
    db_pool: &SqlitePool,
    name: &str,
    description: &str,
    category_id: &str,
    price: f64,
    preparation_time: i64,
    is_available: bool,
    image: Option<StoredImage>,
) -> AppResult<MenuItemView> {
    if name.trim().is_empty() || description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide all required fields".to_string(),
        ));
    }
    if price < 0.0 {
        return Err(AppError::Validation("Price cannot be negative".to_string()));
    }
    if preparation_time < 1 {
        return Err(AppError::Validation(
            "Preparation time must be at least 1 minute".to_string(),
        ));
    }

    // A categoria referenciada tem de existir
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?1")
        .bind(category_id)
        .fetch_optional(db_pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let (image_url, image_public_id) = match &image {
        Some(img) => (Some(img.url.as_str()), Some(img.public_id.as_str())),
        None => (None, None),
    };

    sqlx::query(
        "INSERT INTO menu_items \
           (id, name, description, category_id, price, is_available, preparation_time, \
            image_url, image_public_id, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(&id)
    .bind(name)
    .bind(description)
    .bind(category_id)
    .bind(price)
    .bind(is_available)
    .bind(preparation_time)
    .bind(image_url)
    .bind(image_public_id)
    .bind(now)
    .execute(db_pool)
    .await?;

    tracing::info!("✅ Item do menu '{}' criado.", name);
    get_menu_item(db_pool, &id).await
}

/// Atualiza campos opcionais de um item (os omitidos ficam como estão).
#[allow(clippy::too_many_arguments)]
pub async fn update_menu_item(
    db_pool: &SqlitePool,
    item_id: &str,
    name: Option<&str>,
    description: Option<&str>,
    category_id: Option<&str>,
    price: Option<f64>,
    preparation_time: Option<i64>,
    is_available: Option<bool>,
    image: Option<StoredImage>,
) -> AppResult<MenuItemView> {
    let current = find_menu_item(db_pool, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;

    if let Some(category_id) = category_id {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?1")
            .bind(category_id)
            .fetch_optional(db_pool)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
    }
    if let Some(price) = price {
        if price < 0.0 {
            return Err(AppError::Validation("Price cannot be negative".to_string()));
        }
    }
    if let Some(prep) = preparation_time {
        if prep < 1 {
            return Err(AppError::Validation(
                "Preparation time must be at least 1 minute".to_string(),
            ));
        }
    }

    let name = name.unwrap_or(&current.name);
    let description = description.unwrap_or(&current.description);
    let category_id = category_id.unwrap_or(&current.category_id);
    let price = price.unwrap_or(current.price);
    let preparation_time = preparation_time.unwrap_or(current.preparation_time);
    let is_available = is_available.unwrap_or(current.is_available);
    let (image_url, image_public_id) = match &image {
        Some(img) => (Some(img.url.clone()), Some(img.public_id.clone())),
        None => (current.image_url.clone(), current.image_public_id.clone()),
    };

    sqlx::query(
        "UPDATE menu_items SET name = ?1, description = ?2, category_id = ?3, price = ?4, \
            preparation_time = ?5, is_available = ?6, image_url = ?7, image_public_id = ?8, \
            updated_at = ?9 \
         WHERE id = ?10",
    )
    .bind(name)
    .bind(description)
    .bind(category_id)
    .bind(price)
    .bind(preparation_time)
    .bind(is_available)
    .bind(&image_url)
    .bind(&image_public_id)
    .bind(Utc::now())
    .bind(item_id)
    .execute(db_pool)
    .await?;

    tracing::info!("✅ Item do menu '{}' atualizado.", item_id);
    get_menu_item(db_pool, item_id).await
}

/// Apaga um item; devolve o public_id da imagem para o handler limpar.
pub async fn delete_menu_item(db_pool: &SqlitePool, item_id: &str) -> AppResult<Option<String>> {
    let current = find_menu_item(db_pool, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;

    sqlx::query("DELETE FROM menu_items WHERE id = ?1")
        .bind(item_id)
        .execute(db_pool)
        .await?;

    tracing::info!("🗑️ Item do menu '{}' apagado.", current.name);
    Ok(current.image_public_id)
}

/// Inverte a flag de disponibilidade.
pub async fn toggle_availability(db_pool: &SqlitePool, item_id: &str) -> AppResult<MenuItemView> {
    let rows_affected = sqlx::query(
        "UPDATE menu_items SET is_available = NOT is_available, updated_at = ?1 WHERE id = ?2",
    )
    .bind(Utc::now())
    .bind(item_id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::NotFound("Menu item not found".to_string()));
    }
    get_menu_item(db_pool, item_id).await
}

/// Linha crua da tabela (com image_public_id), para uso interno dos admins.
pub async fn find_menu_item(db_pool: &SqlitePool, item_id: &str) -> AppResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE id = ?1")
        .bind(item_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(item)
}

// --- Mutações de Admin: categorias ---

pub async fn create_category(
    db_pool: &SqlitePool,
    name: &str,
    description: &str,
) -> AppResult<Category> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide category name".to_string(),
        ));
    }

    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE name = ?1")
        .bind(name)
        .fetch_optional(db_pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("Category already exists".to_string()));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO categories (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&id)
    .bind(name)
    .bind(description)
    .bind(Utc::now())
    .execute(db_pool)
    .await?;

    tracing::info!("✅ Categoria '{}' criada.", name);
    get_category(db_pool, &id).await
}

pub async fn update_category(
    db_pool: &SqlitePool,
    category_id: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> AppResult<Category> {
    let current = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at FROM categories WHERE id = ?1",
    )
    .bind(category_id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or(&current.name);
    let description = description.unwrap_or(&current.description);

    sqlx::query("UPDATE categories SET name = ?1, description = ?2 WHERE id = ?3")
        .bind(name)
        .bind(description)
        .bind(category_id)
        .execute(db_pool)
        .await?;

    get_category(db_pool, category_id).await
}

/// Apagar uma categoria é bloqueado enquanto houver itens a referenciá-la.
pub async fn delete_category(db_pool: &SqlitePool, category_id: &str) -> AppResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?1")
        .bind(category_id)
        .fetch_optional(db_pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    let referencing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE category_id = ?1")
            .bind(category_id)
            .fetch_one(db_pool)
            .await?;
    if referencing > 0 {
        tracing::warn!(
            "Delete de categoria {} bloqueado: {} itens referenciam-na",
            category_id, referencing
        );
        return Err(AppError::Conflict(format!(
            "Cannot delete category. {referencing} menu items are using this category."
        )));
    }

    sqlx::query("DELETE FROM categories WHERE id = ?1")
        .bind(category_id)
        .execute(db_pool)
        .await?;
    tracing::info!("🗑️ Categoria '{}' apagada.", category_id);
    Ok(())
}

async fn get_category(db_pool: &SqlitePool, category_id: &str) -> AppResult<Category> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at FROM categories WHERE id = ?1",
    )
    .bind(category_id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn category_delete_is_blocked_while_referenced() {
        let pool = test_pool().await;
        let category = create_category(&pool, "Pratos", "").await.unwrap();
        create_menu_item(&pool, "Bifana", "d", &category.id, 3.5, 10, true, None)
            .await
            .unwrap();
        create_menu_item(&pool, "Prego", "d", &category.id, 4.0, 12, true, None)
            .await
            .unwrap();

        let err = delete_category(&pool, &category.id).await.unwrap_err();
        // A mensagem cita o número de itens que ainda referenciam
        assert!(matches!(err, AppError::Conflict(ref m)
            if m == "Cannot delete category. 2 menu items are using this category."));

        // A categoria continua lá
        assert_eq!(list_categories(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn category_delete_works_when_unreferenced() {
        let pool = test_pool().await;
        let category = create_category(&pool, "Pratos", "").await.unwrap();
        delete_category(&pool, &category.id).await.unwrap();
        assert!(list_categories(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_category_name_conflicts() {
        let pool = test_pool().await;
        create_category(&pool, "Pratos", "").await.unwrap();
        let err = create_category(&pool, "Pratos", "outra").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn item_requires_existing_category() {
        let pool = test_pool().await;
        let err = create_menu_item(&pool, "Bifana", "d", "cat-fantasma", 3.5, 10, true, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_filters_by_availability_and_search() {
        let pool = test_pool().await;
        let category = create_category(&pool, "Pratos", "").await.unwrap();
        create_menu_item(&pool, "Bifana", "pão com carne", &category.id, 3.5, 10, true, None)
            .await
            .unwrap();
        let off = create_menu_item(&pool, "Prego", "pão com bife", &category.id, 4.0, 12, true, None)
            .await
            .unwrap();
        toggle_availability(&pool, &off.id).await.unwrap();

        let q = MenuListQuery {
            is_available: Some(true),
            ..Default::default()
        };
        let (items, total) = list_menu_items(&pool, &q).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].name, "Bifana");

        // A pesquisa rápida também ignora os indisponíveis
        let hits = search_menu_items(&pool, "pão").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Bifana");
    }

    #[tokio::test]
    async fn toggle_flips_availability() {
        let pool = test_pool().await;
        let category = create_category(&pool, "Pratos", "").await.unwrap();
        let item = create_menu_item(&pool, "Bifana", "d", &category.id, 3.5, 10, true, None)
            .await
            .unwrap();

        let toggled = toggle_availability(&pool, &item.id).await.unwrap();
        assert!(!toggled.is_available);
        let toggled = toggle_availability(&pool, &item.id).await.unwrap();
        assert!(toggled.is_available);
    }
}
