// src/web/order_handlers.rs
use crate::{
    error::AppResult,
    models::order::{
        AdminOrderQuery, OrderListQuery, PlaceOrderBody, UpdateStatusBody, STATUS_READY,
    },
    notify,
    services::{order_service, user_service},
    state::AppState,
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

// POST /api/orders
pub async fn handle_place_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<PlaceOrderBody>,
) -> AppResult<impl IntoResponse> {
    let order =
        order_service::place_order(&state.db_pool, &user.id, body.special_instructions).await?;

    // Confirmação por email em background; o pedido já está criado
    let (subject, html) = notify::order_confirmation_email(&user.name, &order);
    notify::spawn_send(state.mailer.clone(), user.email.clone(), subject, html);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": order })),
    ))
}

// GET /api/orders
pub async fn handle_list_my_orders(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(q): Query<OrderListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(10).clamp(1, 100);

    let (orders, total) =
        order_service::get_user_orders(&state.db_pool, &user.id, q.status.as_deref(), page, limit)
            .await?;

    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "total": total,
        "page": page,
        "data": orders,
    })))
}

// GET /api/orders/{id}
pub async fn handle_get_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let order = order_service::get_order(&state.db_pool, &user.id, &order_id).await?;
    Ok(Json(json!({ "success": true, "data": order })))
}

// PUT /api/orders/{id}/cancel
pub async fn handle_cancel_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let order = order_service::cancel_order(&state.db_pool, &user.id, &order_id).await?;
    Ok(Json(json!({ "success": true, "message": "Order cancelled", "data": order })))
}

// --- Rotas de Admin ---

// GET /api/orders/admin/all
pub async fn handle_list_all_orders(
    State(state): State<AppState>,
    Query(q): Query<AdminOrderQuery>,
) -> AppResult<impl IntoResponse> {
    let (orders, total, stats) = order_service::get_all_orders(&state.db_pool, &q).await?;
    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "total": total,
        "statusSummary": stats,
        "data": orders,
    })))
}

// GET /api/orders/admin/stats
pub async fn handle_order_stats(
    State(state): State<AppState>,
    Query(q): Query<AdminOrderQuery>,
) -> AppResult<impl IntoResponse> {
    let stats = order_service::get_order_stats(
        &state.db_pool,
        q.start_date.as_deref(),
        q.end_date.as_deref(),
    )
    .await?;
    Ok(Json(json!({ "success": true, "data": stats })))
}

// PUT /api/orders/{id}/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> AppResult<impl IntoResponse> {
    let order = order_service::update_order_status(&state.db_pool, &order_id, &body.status).await?;

    // Avisa o dono quando o pedido fica pronto para levantar
    if order.status == STATUS_READY {
        if let Some(owner) = user_service::find_user_by_id(&state.db_pool, &order.user_id).await? {
            let (subject, html) = notify::order_status_email(&owner.name, &order.id, &order.status);
            notify::spawn_send(state.mailer.clone(), owner.email, subject, html);
        }
    }

    Ok(Json(json!({ "success": true, "data": order })))
}
