// src/web/user_handlers.rs
use crate::{
    error::{AppError, AppResult},
    images::ImageStore,
    models::user::{ChangePasswordBody, UpdateProfileBody, UpdateRoleBody, UserListQuery},
    services::user_service,
    state::AppState,
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Extension, Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

// GET /api/users/profile
pub async fn handle_get_profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(json!({ "success": true, "data": user })))
}

// PUT /api/users/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<UpdateProfileBody>,
) -> AppResult<impl IntoResponse> {
    let updated = user_service::update_profile(
        &state.db_pool,
        &user.id,
        body.name.as_deref(),
        body.phone.as_deref(),
    )
    .await?;
    Ok(Json(json!({ "success": true, "data": updated })))
}

// PUT /api/users/password
pub async fn handle_change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<ChangePasswordBody>,
) -> AppResult<impl IntoResponse> {
    user_service::change_password(
        &state.db_pool,
        &user.id,
        &body.current_password,
        &body.new_password,
    )
    .await?;
    tracing::info!("✅ Senha alterada para {}", user.email);
    Ok(Json(json!({ "success": true, "message": "Password updated" })))
}

// POST /api/users/avatar (multipart, campo "avatar")
pub async fn handle_upload_avatar(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() == Some("avatar") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;
            bytes = Some(data.to_vec());
        }
    }

    let bytes = bytes.ok_or_else(|| AppError::Validation("Please upload a file".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Please upload a file".to_string()));
    }
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(AppError::Validation(
            "Image size must be less than 5MB".to_string(),
        ));
    }

    // Avatar antigo que não se deixa apagar vira órfão; o registo na DB
    // é trocado na mesma
    if let Some(old_id) = &user.avatar_public_id {
        discard_avatar(state.images.as_ref(), old_id).await;
    }
    let stored = state.images.upload(bytes, "avatars").await?;
    user_service::set_avatar(&state.db_pool, &user.id, &stored.url, &stored.public_id).await?;

    tracing::info!("✅ Avatar atualizado para {}", user.email);
    Ok(Json(json!({ "success": true, "data": { "avatar": stored.url } })))
}

// DELETE /api/users/avatar
pub async fn handle_delete_avatar(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    let old_id = user
        .avatar_public_id
        .as_deref()
        .ok_or_else(|| AppError::Validation("No avatar to delete".to_string()))?;

    discard_avatar(state.images.as_ref(), old_id).await;
    user_service::clear_avatar(&state.db_pool, &user.id).await?;
    Ok(Json(json!({ "success": true, "message": "Avatar removed" })))
}

// O registo na DB manda; uma imagem órfã no armazenamento só merece um log.
async fn discard_avatar(images: &dyn ImageStore, public_id: &str) {
    if let Err(e) = images.delete(public_id).await {
        tracing::warn!("Avatar antigo {} não foi apagado: {:?}", public_id, e);
    }
}

// --- Rotas de Admin ---

// GET /api/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    Query(q): Query<UserListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(20).clamp(1, 100);

    let (users, total) = user_service::find_all_users(
        &state.db_pool,
        q.role.as_deref(),
        q.search.as_deref(),
        page,
        limit,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "count": users.len(),
        "total": total,
        "page": page,
        "data": users,
    })))
}

// PUT /api/users/{id}/role
pub async fn handle_update_role(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateRoleBody>,
) -> AppResult<impl IntoResponse> {
    // Um admin não se pode despromover a si próprio
    if admin.id == user_id {
        return Err(AppError::Validation(
            "You cannot change your own role".to_string(),
        ));
    }

    let updated = user_service::update_user_role(&state.db_pool, &user_id, &body.role).await?;
    tracing::info!("✅ Role de {} alterada para '{}'", updated.email, updated.role);
    Ok(Json(json!({ "success": true, "data": updated })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::images::StoredImage;
    use crate::models::user::User;
    use crate::notify::LogMailer;
    use crate::services::auth_service::TokenKeys;
    use async_trait::async_trait;
    use std::sync::Arc;

    // Armazenamento onde o delete falha sempre (ficheiro ilegível, etc.)
    struct BrokenDeleteStore;

    #[async_trait]
    impl ImageStore for BrokenDeleteStore {
        async fn upload(&self, _bytes: Vec<u8>, folder: &str) -> AppResult<StoredImage> {
            Ok(StoredImage {
                url: format!("/uploads/{folder}/novo.img"),
                public_id: format!("{folder}/novo.img"),
            })
        }

        async fn delete(&self, _public_id: &str) -> AppResult<()> {
            Err(AppError::Dependency("Failed to delete image".to_string()))
        }
    }

    async fn state_with_broken_store() -> AppState {
        AppState {
            db_pool: test_pool().await,
            token_keys: Arc::new(TokenKeys::new(b"segredo-de-teste-bastante-longo", 24)),
            mailer: Arc::new(LogMailer),
            images: Arc::new(BrokenDeleteStore),
        }
    }

    async fn registered_user(state: &AppState) -> User {
        user_service::register_user(
            &state.db_pool,
            "Ana",
            "ana@campus.edu",
            "S-1",
            "911111111",
            "password1",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn avatar_removal_survives_a_failing_store_delete() {
        let state = state_with_broken_store().await;
        let user = registered_user(&state).await;
        user_service::set_avatar(
            &state.db_pool,
            &user.id,
            "/uploads/avatars/velho.img",
            "avatars/velho.img",
        )
        .await
        .unwrap();
        let user = user_service::find_user_by_id(&state.db_pool, &user.id)
            .await
            .unwrap()
            .unwrap();

        // A imagem velha vira órfã (logada), mas o registo é limpo na mesma
        let result =
            handle_delete_avatar(State(state.clone()), Extension(CurrentUser(user.clone()))).await;
        assert!(result.is_ok());

        let user = user_service::find_user_by_id(&state.db_pool, &user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(user.avatar_url.is_none());
        assert!(user.avatar_public_id.is_none());
    }

    #[tokio::test]
    async fn deleting_a_missing_avatar_is_rejected() {
        let state = state_with_broken_store().await;
        let user = registered_user(&state).await;

        let err = handle_delete_avatar(State(state), Extension(CurrentUser(user)))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(ref m) if m == "No avatar to delete"));
    }
}
