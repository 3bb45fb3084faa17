// src/web/cart_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::cart::{AddItemBody, UpdateQuantityBody},
    services::cart_service,
    state::AppState,
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Extension, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

// GET /api/cart
pub async fn handle_get_cart(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let cart = cart_service::get_or_create_cart(&state.db_pool, &user.id).await?;
    Ok(Json(json!({ "success": true, "data": cart })))
}

// POST /api/cart/items
pub async fn handle_add_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<AddItemBody>,
) -> AppResult<impl IntoResponse> {
    let menu_item_id = body
        .menu_item_id
        .ok_or_else(|| AppError::Validation("Please provide a menu item".to_string()))?;
    let quantity = body.quantity.unwrap_or(1);

    tracing::debug!("Add ao carrinho: {} x{} por {}", menu_item_id, quantity, user.id);
    let cart = cart_service::add_item(&state.db_pool, &user.id, &menu_item_id, quantity).await?;
    Ok(Json(json!({ "success": true, "message": "Item added to cart", "data": cart })))
}

// PUT /api/cart/items/{menuItemId}
pub async fn handle_update_quantity(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(menu_item_id): Path<String>,
    Json(body): Json<UpdateQuantityBody>,
) -> AppResult<impl IntoResponse> {
    let quantity = body
        .quantity
        .ok_or_else(|| AppError::Validation("Please provide a quantity".to_string()))?;

    let cart =
        cart_service::update_item_quantity(&state.db_pool, &user.id, &menu_item_id, quantity)
            .await?;
    Ok(Json(json!({ "success": true, "data": cart })))
}

// DELETE /api/cart/items/{menuItemId}
pub async fn handle_remove_item(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(menu_item_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let cart = cart_service::remove_item(&state.db_pool, &user.id, &menu_item_id).await?;
    Ok(Json(json!({ "success": true, "message": "Item removed from cart", "data": cart })))
}

// DELETE /api/cart
pub async fn handle_clear_cart(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let cart = cart_service::clear(&state.db_pool, &user.id).await?;
    tracing::info!("🗑️ Carrinho de {} esvaziado", user.id);
    Ok(Json(json!({ "success": true, "message": "Cart cleared", "data": cart })))
}
