// src/web/admin_handlers.rs
//
// Gestão do catálogo (itens do menu e categorias). Todas estas rotas
// estão atrás do mw_auth + mw_admin.
use crate::{
    error::{AppError, AppResult},
    models::category::CategoryBody,
    models::menu_item::MenuItemInput,
    services::catalog_service,
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

// Lê os campos textuais + ficheiro "image" de um form multipart.
async fn read_item_form(mut multipart: Multipart) -> AppResult<(MenuItemInput, Option<Vec<u8>>)> {
    let mut input = MenuItemInput::default();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid form: {e}")))?;
                if !data.is_empty() {
                    if data.len() > MAX_IMAGE_BYTES {
                        return Err(AppError::Validation(
                            "Image size must be less than 5MB".to_string(),
                        ));
                    }
                    image = Some(data.to_vec());
                }
            }
            other => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid form: {e}")))?;
                match other {
                    "name" => input.name = Some(text),
                    "description" => input.description = Some(text),
                    "category" => input.category = Some(text),
                    "price" => {
                        input.price = Some(text.parse().map_err(|_| {
                            AppError::Validation("Price must be a number".to_string())
                        })?)
                    }
                    "preparationTime" => {
                        input.preparation_time = Some(text.parse().map_err(|_| {
                            AppError::Validation("Preparation time must be a number".to_string())
                        })?)
                    }
                    "isAvailable" => input.is_available = Some(text == "true" || text == "1"),
                    // Campos desconhecidos são ignorados
                    _ => {}
                }
            }
        }
    }
    Ok((input, image))
}

// POST /api/menu (multipart)
pub async fn handle_create_item(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (input, image_bytes) = read_item_form(multipart).await?;

    let (name, category, price, preparation_time) = match (
        input.name,
        input.category,
        input.price,
        input.preparation_time,
    ) {
        (Some(n), Some(c), Some(p), Some(t)) if !n.trim().is_empty() => (n, c, p, t),
        _ => {
            return Err(AppError::Validation(
                "Please provide all required fields".to_string(),
            ))
        }
    };

    let image = match image_bytes {
        Some(bytes) => Some(state.images.upload(bytes, "menu").await?),
        None => None,
    };

    let item = catalog_service::create_menu_item(
        &state.db_pool,
        name.trim(),
        input.description.as_deref().unwrap_or(""),
        &category,
        price,
        preparation_time,
        input.is_available.unwrap_or(true),
        image,
    )
    .await?;

    tracing::info!("✅ Item de menu criado: {}", item.name);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": item })),
    ))
}

// PUT /api/menu/{id} (multipart, campos todos opcionais)
pub async fn handle_update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (input, image_bytes) = read_item_form(multipart).await?;

    // Imagem nova substitui a antiga no armazenamento antes da DB mudar
    let image = match image_bytes {
        Some(bytes) => {
            let current = catalog_service::find_menu_item(&state.db_pool, &item_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;
            if let Some(old_id) = &current.image_public_id {
                state.images.delete(old_id).await?;
            }
            Some(state.images.upload(bytes, "menu").await?)
        }
        None => None,
    };

    let item = catalog_service::update_menu_item(
        &state.db_pool,
        &item_id,
        input.name.as_deref(),
        input.description.as_deref(),
        input.category.as_deref(),
        input.price,
        input.preparation_time,
        input.is_available,
        image,
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": item })))
}

// DELETE /api/menu/{id}
pub async fn handle_delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let orphan_image = catalog_service::delete_menu_item(&state.db_pool, &item_id).await?;

    // O item já saiu da DB; uma imagem órfã só merece um log
    if let Some(public_id) = orphan_image {
        if let Err(e) = state.images.delete(&public_id).await {
            tracing::warn!("Imagem órfã {} não foi apagada: {:?}", public_id, e);
        }
    }

    tracing::info!("🗑️ Item de menu apagado: {}", item_id);
    Ok(Json(json!({ "success": true, "message": "Menu item deleted" })))
}

// PATCH /api/menu/{id}/availability
pub async fn handle_toggle_availability(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let item = catalog_service::toggle_availability(&state.db_pool, &item_id).await?;
    tracing::info!(
        "✅ Item {} agora {}",
        item.name,
        if item.is_available { "disponível" } else { "indisponível" }
    );
    Ok(Json(json!({ "success": true, "data": item })))
}

// --- Categorias ---

// POST /api/menu/categories
pub async fn handle_create_category(
    State(state): State<AppState>,
    Json(body): Json<CategoryBody>,
) -> AppResult<impl IntoResponse> {
    let category = catalog_service::create_category(
        &state.db_pool,
        body.name.as_deref().unwrap_or(""),
        body.description.as_deref().unwrap_or(""),
    )
    .await?;
    tracing::info!("✅ Categoria criada: {}", category.name);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": category })),
    ))
}

// PUT /api/menu/categories/{id}
pub async fn handle_update_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Json(body): Json<CategoryBody>,
) -> AppResult<impl IntoResponse> {
    let name = body.name.as_deref().filter(|n| !n.trim().is_empty());
    let category = catalog_service::update_category(
        &state.db_pool,
        &category_id,
        name,
        body.description.as_deref(),
    )
    .await?;
    Ok(Json(json!({ "success": true, "data": category })))
}

// DELETE /api/menu/categories/{id}
pub async fn handle_delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    catalog_service::delete_category(&state.db_pool, &category_id).await?;
    tracing::info!("🗑️ Categoria apagada: {}", category_id);
    Ok(Json(json!({ "success": true, "message": "Category deleted" })))
}
