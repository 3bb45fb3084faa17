// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{ForgotPasswordBody, LoginBody, RegisterBody, ResetPasswordBody},
    notify,
    services::{auth_service, user_service},
    state::AppState,
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("Tentativa de registo para: {}", body.email);

    let user = user_service::register_user(
        &state.db_pool,
        &body.name,
        &body.email,
        &body.student_id,
        &body.phone,
        &body.password,
    )
    .await?;

    let token = auth_service::sign_token(&state.token_keys, &user)?;
    tracing::info!("✅ Registo bem-sucedido para: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "token": token, "user": user })),
    ))
}

// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> AppResult<impl IntoResponse> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Please provide email and password".to_string(),
        ));
    }

    tracing::info!("Tentativa de login para: {}", body.email);

    // Email desconhecido e senha errada dão a MESMA resposta
    let user = match user_service::find_user_by_email(&state.db_pool, &body.email).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login falhado: email desconhecido {}", body.email);
            return Err(AppError::Auth("Invalid credentials".to_string()));
        }
    };

    if !auth_service::verify_password(&body.password, &user.password_hash).await? {
        tracing::warn!("Login falhado: senha incorreta para {}", body.email);
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let token = auth_service::sign_token(&state.token_keys, &user)?;
    tracing::info!("✅ Login bem-sucedido para: {}", user.email);

    Ok(Json(json!({ "success": true, "token": token, "user": user })))
}

// GET /api/auth/me
pub async fn handle_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(json!({ "success": true, "data": user })))
}

// POST /api/auth/forgot-password
//
// Único sítio onde o envio de email é síncrono: se o email não sair,
// o token guardado é inútil e é limpo antes de devolver o erro.
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordBody>,
) -> AppResult<impl IntoResponse> {
    let user = user_service::find_user_by_email(&state.db_pool, &body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("There is no user with that email".to_string()))?;

    let (raw_token, token_hash) = auth_service::generate_reset_token();
    user_service::store_reset_token(
        &state.db_pool,
        &user.id,
        &token_hash,
        auth_service::reset_token_expiry(),
    )
    .await?;

    let (subject, html) = notify::password_reset_email(&user.name, &raw_token);
    if let Err(e) = state.mailer.send(&user.email, &subject, &html).await {
        tracing::error!("Falha ao enviar email de reset para {}: {:?}", user.email, e);
        user_service::clear_reset_token(&state.db_pool, &user.id).await?;
        return Err(notify::dependency_error(e));
    }

    tracing::info!("📧 Email de reset de senha enviado para {}", user.email);
    Ok(Json(json!({ "success": true, "message": "Email sent" })))
}

// PUT /api/auth/reset-password/{token}
pub async fn handle_reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<ResetPasswordBody>,
) -> AppResult<impl IntoResponse> {
    if body.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let token_hash = auth_service::hash_reset_token(&token);
    let user = user_service::find_user_by_reset_token(&state.db_pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid or expired reset token".to_string()))?;

    user_service::set_password(&state.db_pool, &user.id, &body.password).await?;
    user_service::clear_reset_token(&state.db_pool, &user.id).await?;
    tracing::info!("✅ Senha redefinida para {}", user.email);

    // Sessão nova imediatamente, sem obrigar a novo login
    let token = auth_service::sign_token(&state.token_keys, &user)?;
    Ok(Json(json!({ "success": true, "token": token })))
}
