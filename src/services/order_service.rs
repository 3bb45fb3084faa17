// src/services/order_service.rs
//
// Conversão carrinho -> pedido e ciclo de vida do pedido.
// O place_order revalida a disponibilidade de TODAS as linhas e faz
// a criação do pedido + limpeza do carrinho numa única transação.
use crate::{
    error::{AppError, AppResult},
    models::order::{
        AdminOrderQuery, DailyStat, Order, OrderItem, OrderStats, OrderView, OverallStats,
        PopularItem, StatusStat, STATUS_CANCELLED, STATUS_PENDING, STATUS_READY, VALID_STATUSES,
    },
    services::cart_service,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

// Janela máxima de preparação prometida ao cliente
const MAX_PREP_MINUTES: i64 = 60;

const ORDER_COLUMNS: &str = "id, user_id, total_amount, status, special_instructions, \
     order_date, estimated_ready_time, actual_ready_time, created_at";

/// Converte o carrinho do utilizador num pedido Pending.
pub async fn place_order(
    db_pool: &SqlitePool,
    user_id: &str,
    special_instructions: Option<String>,
) -> AppResult<OrderView> {
    let mut tx = db_pool.begin().await?;

    let cart = cart_service::find_cart(&mut tx, user_id).await?;
    let cart = match cart {
        Some(cart) => cart,
        None => return Err(AppError::Validation("Cart is empty".to_string())),
    };

    let lines = sqlx::query_as::<_, crate::models::cart::CartItem>(
        "SELECT menu_item_id, name, price, quantity, subtotal \
         FROM cart_items WHERE cart_id = ?1 ORDER BY rowid",
    )
    .bind(&cart.id)
    .fetch_all(&mut *tx)
    .await?;

    if lines.is_empty() {
        return Err(AppError::Validation("Cart is empty".to_string()));
    }

    // Revalida cada linha contra o catálogo ATUAL: se um item desapareceu
    // ou ficou indisponível, o pedido inteiro falha (nada parcial).
    let mut max_prep_minutes: i64 = 0;
    for line in &lines {
        let row: Option<(bool, i64)> = sqlx::query_as(
            "SELECT is_available, preparation_time FROM menu_items WHERE id = ?1",
        )
        .bind(&line.menu_item_id)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some((true, prep)) => max_prep_minutes = max_prep_minutes.max(prep),
            _ => {
                tracing::warn!(
                    "Place order rejeitado para {}: item '{}' indisponível",
                    user_id, line.name
                );
                return Err(AppError::Conflict(format!(
                    "Item \"{}\" is no longer available",
                    line.name
                )));
            }
        }
    }

    // Janela estimada: MÁXIMO dos tempos de preparação (não a soma),
    // com teto de 60 minutos.
    let prep_minutes = max_prep_minutes.min(MAX_PREP_MINUTES);
    let now = Utc::now();
    let estimated_ready_time = now + Duration::minutes(prep_minutes);

    let order_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO orders \
           (id, user_id, total_amount, status, special_instructions, order_date, \
            estimated_ready_time, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?6)",
    )
    .bind(&order_id)
    .bind(user_id)
    .bind(cart.total_amount)
    .bind(STATUS_PENDING)
    .bind(special_instructions.unwrap_or_default())
    .bind(now)
    .bind(estimated_ready_time)
    .execute(&mut *tx)
    .await?;

    // Copia cada linha do carrinho para o pedido (snapshot imutável)
    for line in &lines {
        sqlx::query(
            "INSERT INTO order_items (order_id, menu_item_id, name, quantity, price, subtotal) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&order_id)
        .bind(&line.menu_item_id)
        .bind(&line.name)
        .bind(line.quantity)
        .bind(line.price)
        .bind(line.subtotal)
        .execute(&mut *tx)
        .await?;
    }

    // Esvazia o carrinho na MESMA transação que criou o pedido
    cart_service::clear_in_tx(&mut tx, &cart.id).await?;
    tx.commit().await?;

    tracing::info!(
        "✅ Pedido {} criado para {} ({} linhas, pronto ~{} min)",
        order_id, user_id, lines.len(), prep_minutes
    );
    get_order_view(db_pool, &order_id).await
}

/// Pedidos do próprio utilizador, mais recentes primeiro.
pub async fn get_user_orders(
    db_pool: &SqlitePool,
    user_id: &str,
    status: Option<&str>,
    page: i64,
    limit: i64,
) -> AppResult<(Vec<OrderView>, i64)> {
    let mut where_sql = String::from("WHERE user_id = ?");
    if status.is_some() {
        where_sql.push_str(" AND status = ?");
    }

    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders {where_sql} ORDER BY order_date DESC LIMIT ? OFFSET ?"
    );
    let mut query = sqlx::query_as::<_, Order>(&sql).bind(user_id);
    if let Some(status) = status {
        query = query.bind(status);
    }
    let orders = query
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(db_pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM orders {where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
    if let Some(status) = status {
        count_query = count_query.bind(status);
    }
    let total = count_query.fetch_one(db_pool).await?;

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let items = load_order_items(db_pool, &order.id).await?;
        views.push(OrderView::from_parts(order, items));
    }
    Ok((views, total))
}

/// Busca um pedido do próprio utilizador (não-dono vê NotFound).
pub async fn get_order(db_pool: &SqlitePool, user_id: &str, order_id: &str) -> AppResult<OrderView> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1 AND user_id = ?2"
    ))
    .bind(order_id)
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let items = load_order_items(db_pool, &order.id).await?;
    Ok(OrderView::from_parts(order, items))
}

/// Cancela um pedido do próprio utilizador; só é legal a partir de Pending.
pub async fn cancel_order(
    db_pool: &SqlitePool,
    user_id: &str,
    order_id: &str,
) -> AppResult<OrderView> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1 AND user_id = ?2"
    ))
    .bind(order_id)
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.status != STATUS_PENDING {
        tracing::warn!(
            "Cancelamento rejeitado: pedido {} está '{}'",
            order_id, order.status
        );
        return Err(AppError::Conflict(
            "Can only cancel pending orders".to_string(),
        ));
    }

    sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2")
        .bind(STATUS_CANCELLED)
        .bind(order_id)
        .execute(db_pool)
        .await?;

    tracing::info!("🚫 Pedido {} cancelado por {}", order_id, user_id);
    get_order_view(db_pool, order_id).await
}

// --- Operações de Admin ---

/// Lista todos os pedidos com filtros de estado/datas e paginação,
/// mais o resumo por estado para o mesmo filtro.
pub async fn get_all_orders(
    db_pool: &SqlitePool,
    q: &AdminOrderQuery,
) -> AppResult<(Vec<OrderView>, i64, Vec<StatusStat>)> {
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(20).clamp(1, 100);
    let (start, end) = parse_date_window(q.start_date.as_deref(), q.end_date.as_deref())?;

    let mut where_sql = String::from("WHERE 1=1");
    if q.status.is_some() {
        where_sql.push_str(" AND status = ?");
    }
    if start.is_some() {
        where_sql.push_str(" AND order_date >= ?");
    }
    if end.is_some() {
        where_sql.push_str(" AND order_date <= ?");
    }

    macro_rules! bind_filters {
        ($query:expr) => {{
            let mut query = $query;
            if let Some(status) = &q.status {
                query = query.bind(status);
            }
            if let Some(start) = start {
                query = query.bind(start);
            }
            if let Some(end) = end {
                query = query.bind(end);
            }
            query
        }};
    }

    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders {where_sql} ORDER BY order_date DESC LIMIT ? OFFSET ?"
    );
    let orders = bind_filters!(sqlx::query_as::<_, Order>(&sql))
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(db_pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM orders {where_sql}");
    let total = bind_filters!(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(db_pool)
        .await?;

    let stats_sql = format!(
        "SELECT status, COUNT(*) AS count, COALESCE(SUM(total_amount), 0) AS total_amount \
         FROM orders {where_sql} GROUP BY status"
    );
    let stats = bind_filters!(sqlx::query_as::<_, StatusStat>(&stats_sql))
        .fetch_all(db_pool)
        .await?;

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let items = load_order_items(db_pool, &order.id).await?;
        views.push(OrderView::from_parts(order, items));
    }
    Ok((views, total, stats))
}

/// Muda o estado de um pedido. Ao entrar em Ready (vindo de outro estado)
/// carimba o actual_ready_time.
pub async fn update_order_status(
    db_pool: &SqlitePool,
    order_id: &str,
    new_status: &str,
) -> AppResult<OrderView> {
    if !VALID_STATUSES.contains(&new_status) {
        return Err(AppError::Validation("Invalid status".to_string()));
    }

    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
    ))
    .bind(order_id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let entering_ready = new_status == STATUS_READY && order.status != STATUS_READY;
    if entering_ready {
        sqlx::query("UPDATE orders SET status = ?1, actual_ready_time = ?2 WHERE id = ?3")
            .bind(new_status)
            .bind(Utc::now())
            .bind(order_id)
            .execute(db_pool)
            .await?;
    } else {
        sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2")
            .bind(new_status)
            .bind(order_id)
            .execute(db_pool)
            .await?;
    }

    tracing::info!(
        "✅ Pedido {}: estado '{}' -> '{}'",
        order_id, order.status, new_status
    );
    get_order_view(db_pool, order_id).await
}

/// Estatísticas agregadas para o painel de admin.
pub async fn get_order_stats(
    db_pool: &SqlitePool,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> AppResult<OrderStats> {
    let (start, end) = parse_date_window(start_date, end_date)?;

    let mut where_sql = String::from("WHERE 1=1");
    if start.is_some() {
        where_sql.push_str(" AND order_date >= ?");
    }
    if end.is_some() {
        where_sql.push_str(" AND order_date <= ?");
    }

    macro_rules! bind_window {
        ($query:expr) => {{
            let mut query = $query;
            if let Some(start) = start {
                query = query.bind(start);
            }
            if let Some(end) = end {
                query = query.bind(end);
            }
            query
        }};
    }

    let overall_sql = format!(
        "SELECT COUNT(*) AS total_orders, \
                COALESCE(SUM(total_amount), 0) AS total_revenue, \
                COALESCE(AVG(total_amount), 0) AS average_order_value \
         FROM orders {where_sql}"
    );
    let overall = bind_window!(sqlx::query_as::<_, OverallStats>(&overall_sql))
        .fetch_one(db_pool)
        .await?;

    let by_status_sql = format!(
        "SELECT status, COUNT(*) AS count, COALESCE(SUM(total_amount), 0) AS total_amount \
         FROM orders {where_sql} GROUP BY status"
    );
    let by_status = bind_window!(sqlx::query_as::<_, StatusStat>(&by_status_sql))
        .fetch_all(db_pool)
        .await?;

    // Top 10 itens por quantidade pedida, dentro da janela
    let popular_sql = format!(
        "SELECT oi.name AS name, SUM(oi.quantity) AS total_ordered, \
                COALESCE(SUM(oi.subtotal), 0) AS revenue \
         FROM order_items oi JOIN orders o ON o.id = oi.order_id \
         {} GROUP BY oi.name ORDER BY total_ordered DESC LIMIT 10",
        where_sql.replace("order_date", "o.order_date")
    );
    let popular_items = bind_window!(sqlx::query_as::<_, PopularItem>(&popular_sql))
        .fetch_all(db_pool)
        .await?;

    // Receita por dia, últimos 7 dias (janela fixa, como o painel espera)
    let week_ago = Utc::now() - Duration::days(7);
    let by_date = sqlx::query_as::<_, DailyStat>(
        "SELECT date(order_date) AS day, COUNT(*) AS count, \
                COALESCE(SUM(total_amount), 0) AS revenue \
         FROM orders WHERE order_date >= ?1 GROUP BY day ORDER BY day ASC",
    )
    .bind(week_ago)
    .fetch_all(db_pool)
    .await?;

    Ok(OrderStats {
        overall,
        by_status,
        popular_items,
        by_date,
    })
}

// --- Helpers ---

async fn load_order_items(db_pool: &SqlitePool, order_id: &str) -> AppResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT menu_item_id, name, quantity, price, subtotal \
         FROM order_items WHERE order_id = ?1 ORDER BY rowid",
    )
    .bind(order_id)
    .fetch_all(db_pool)
    .await?;
    Ok(items)
}

async fn get_order_view(db_pool: &SqlitePool, order_id: &str) -> AppResult<OrderView> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
    ))
    .bind(order_id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let items = load_order_items(db_pool, &order.id).await?;
    Ok(OrderView::from_parts(order, items))
}

// Converte "YYYY-MM-DD" nos extremos do dia (fim inclusivo).
fn parse_date_window(
    start: Option<&str>,
    end: Option<&str>,
) -> AppResult<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    let parse = |s: &str| -> AppResult<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("Invalid date: {s}")))
    };
    let start = match start {
        Some(s) => Some(parse(s)?.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()),
        None => None,
    };
    let end = match end {
        Some(s) => Some(
            parse(s)?
                .and_hms_opt(23, 59, 59)
                .unwrap_or_default()
                .and_utc(),
        ),
        None => None,
    };
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::services::{cart_service, catalog_service};

    async fn seed_item(pool: &SqlitePool, name: &str, price: f64, prep: i64) -> String {
        let category = catalog_service::create_category(pool, &format!("cat-{name}"), "")
            .await
            .unwrap();
        catalog_service::create_menu_item(pool, name, "d", &category.id, price, prep, true, None)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn empty_cart_fails_and_creates_no_order() {
        let pool = test_pool().await;

        // Sem carrinho
        let err = place_order(&pool, "u-1", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Cart is empty"));

        // Com carrinho vazio
        cart_service::get_or_create_cart(&pool, "u-1").await.unwrap();
        let err = place_order(&pool, "u-1", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Cart is empty"));

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn unavailable_line_fails_whole_order_and_keeps_cart() {
        let pool = test_pool().await;
        let bifana = seed_item(&pool, "Bifana", 3.5, 10).await;
        let prego = seed_item(&pool, "Prego", 4.0, 20).await;

        cart_service::add_item(&pool, "u-1", &bifana, 1).await.unwrap();
        cart_service::add_item(&pool, "u-1", &prego, 2).await.unwrap();

        // Um dos itens fica indisponível entre o add e o place
        catalog_service::toggle_availability(&pool, &prego).await.unwrap();

        let err = place_order(&pool, "u-1", None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m)
            if m == "Item \"Prego\" is no longer available"));

        // Nenhum pedido parcial; carrinho intacto
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orders, 0);
        let cart = cart_service::get_or_create_cart(&pool, "u-1").await.unwrap();
        assert_eq!(cart.items.len(), 2);
        assert!((cart.total_amount - 11.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn place_order_copies_cart_and_empties_it() {
        let pool = test_pool().await;
        let bifana = seed_item(&pool, "Bifana", 3.5, 10).await;

        cart_service::add_item(&pool, "u-1", &bifana, 3).await.unwrap();
        let order = place_order(&pool, "u-1", Some("sem cebola".to_string()))
            .await
            .unwrap();

        assert_eq!(order.status, STATUS_PENDING);
        assert_eq!(order.special_instructions, "sem cebola");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 3);
        assert!((order.total_amount - 10.5).abs() < 1e-9);

        // O carrinho ficou vazio mas não foi apagado
        let cart = cart_service::get_or_create_cart(&pool, "u-1").await.unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_amount, 0.0);
    }

    #[tokio::test]
    async fn ready_time_is_max_not_sum_capped_at_sixty() {
        let pool = test_pool().await;
        let a = seed_item(&pool, "Bifana", 3.5, 10).await;
        let b = seed_item(&pool, "Francesinha", 9.0, 20).await;

        cart_service::add_item(&pool, "u-1", &a, 1).await.unwrap();
        cart_service::add_item(&pool, "u-1", &b, 1).await.unwrap();

        let before = Utc::now();
        let order = place_order(&pool, "u-1", None).await.unwrap();
        let after = Utc::now();

        // max(10, 20) = 20 minutos, não 30
        let est = order.estimated_ready_time.unwrap();
        assert!(est >= before + Duration::minutes(20));
        assert!(est <= after + Duration::minutes(20));

        // Teto de 60 minutos
        let lento = seed_item(&pool, "Cozido", 12.0, 180).await;
        cart_service::add_item(&pool, "u-1", &lento, 1).await.unwrap();
        let before = Utc::now();
        let order = place_order(&pool, "u-1", None).await.unwrap();
        let est = order.estimated_ready_time.unwrap();
        assert!(est <= before + Duration::minutes(61));
    }

    #[tokio::test]
    async fn cancel_only_from_pending() {
        let pool = test_pool().await;
        let bifana = seed_item(&pool, "Bifana", 3.5, 10).await;
        cart_service::add_item(&pool, "u-1", &bifana, 1).await.unwrap();
        let order = place_order(&pool, "u-1", None).await.unwrap();

        update_order_status(&pool, &order.id, "Preparing").await.unwrap();

        let err = cancel_order(&pool, "u-1", &order.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Estado intacto
        let view = get_order(&pool, "u-1", &order.id).await.unwrap();
        assert_eq!(view.status, "Preparing");
    }

    #[tokio::test]
    async fn cancel_pending_works_and_scopes_to_owner() {
        let pool = test_pool().await;
        let bifana = seed_item(&pool, "Bifana", 3.5, 10).await;
        cart_service::add_item(&pool, "u-1", &bifana, 1).await.unwrap();
        let order = place_order(&pool, "u-1", None).await.unwrap();

        // Outro utilizador não vê o pedido
        let err = cancel_order(&pool, "u-2", &order.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let cancelled = cancel_order(&pool, "u-1", &order.id).await.unwrap();
        assert_eq!(cancelled.status, STATUS_CANCELLED);
    }

    #[tokio::test]
    async fn status_update_validates_and_stamps_ready_time() {
        let pool = test_pool().await;
        let bifana = seed_item(&pool, "Bifana", 3.5, 10).await;
        cart_service::add_item(&pool, "u-1", &bifana, 1).await.unwrap();
        let order = place_order(&pool, "u-1", None).await.unwrap();

        let err = update_order_status(&pool, &order.id, "Eaten").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid status"));

        let updated = update_order_status(&pool, &order.id, "Preparing").await.unwrap();
        assert!(updated.actual_ready_time.is_none());

        let updated = update_order_status(&pool, &order.id, "Ready").await.unwrap();
        assert!(updated.actual_ready_time.is_some());

        // Repetir Ready não re-carimba
        let stamped = updated.actual_ready_time;
        let updated = update_order_status(&pool, &order.id, "Ready").await.unwrap();
        assert_eq!(updated.actual_ready_time, stamped);
    }

    #[tokio::test]
    async fn stats_group_by_status_and_item() {
        let pool = test_pool().await;
        let bifana = seed_item(&pool, "Bifana", 2.0, 10).await;

        cart_service::add_item(&pool, "u-1", &bifana, 2).await.unwrap();
        place_order(&pool, "u-1", None).await.unwrap();
        cart_service::add_item(&pool, "u-2", &bifana, 3).await.unwrap();
        let second = place_order(&pool, "u-2", None).await.unwrap();
        update_order_status(&pool, &second.id, "Completed").await.unwrap();

        let stats = get_order_stats(&pool, None, None).await.unwrap();
        assert_eq!(stats.overall.total_orders, 2);
        assert!((stats.overall.total_revenue - 10.0).abs() < 1e-9);
        assert!((stats.overall.average_order_value - 5.0).abs() < 1e-9);

        assert_eq!(stats.by_status.len(), 2);
        let pending = stats.by_status.iter().find(|s| s.status == "Pending").unwrap();
        assert_eq!(pending.count, 1);

        assert_eq!(stats.popular_items.len(), 1);
        assert_eq!(stats.popular_items[0].name, "Bifana");
        assert_eq!(stats.popular_items[0].total_ordered, 5);
        assert!((stats.popular_items[0].revenue - 10.0).abs() < 1e-9);

        assert_eq!(stats.by_date.len(), 1);
        assert_eq!(stats.by_date[0].count, 2);
    }

    #[tokio::test]
    async fn user_orders_filter_and_paginate() {
        let pool = test_pool().await;
        let bifana = seed_item(&pool, "Bifana", 2.0, 10).await;

        for _ in 0..3 {
            cart_service::add_item(&pool, "u-1", &bifana, 1).await.unwrap();
            place_order(&pool, "u-1", None).await.unwrap();
        }
        let (orders, total) = get_user_orders(&pool, "u-1", None, 1, 2).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(total, 3);

        let (orders, total) = get_user_orders(&pool, "u-1", Some("Cancelled"), 1, 10)
            .await
            .unwrap();
        assert!(orders.is_empty());
        assert_eq!(total, 0);
    }
}
