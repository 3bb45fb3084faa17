// src/web/menu_handlers.rs
//
// Leitura pública do catálogo: menu, categorias e pesquisa.
use crate::{
    error::AppResult,
    models::menu_item::{MenuListQuery, SearchQuery},
    services::catalog_service,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

// GET /api/menu
pub async fn handle_list_menu(
    State(state): State<AppState>,
    Query(q): Query<MenuListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = q.page.unwrap_or(1).max(1);
    let (items, total) = catalog_service::list_menu_items(&state.db_pool, &q).await?;
    Ok(Json(json!({
        "success": true,
        "count": items.len(),
        "total": total,
        "page": page,
        "data": items,
    })))
}

// GET /api/menu/search?q=termo
pub async fn handle_search_menu(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> AppResult<impl IntoResponse> {
    let term = q.q.unwrap_or_default();
    if term.trim().is_empty() {
        // Pesquisa vazia devolve lista vazia, não um erro
        return Ok(Json(json!({ "success": true, "count": 0, "data": [] })));
    }
    let items = catalog_service::search_menu_items(&state.db_pool, term.trim()).await?;
    Ok(Json(json!({ "success": true, "count": items.len(), "data": items })))
}

// GET /api/menu/categories
pub async fn handle_list_categories(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let categories = catalog_service::list_categories(&state.db_pool).await?;
    Ok(Json(json!({ "success": true, "count": categories.len(), "data": categories })))
}

// GET /api/menu/{id}
pub async fn handle_get_menu_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let item = catalog_service::get_menu_item(&state.db_pool, &item_id).await?;
    Ok(Json(json!({ "success": true, "data": item })))
}
