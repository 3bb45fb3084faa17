// src/web/mw_admin.rs
use crate::{
    error::AppError,
    models::user::ROLE_ADMIN,
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Middleware que verifica se o utilizador autenticado tem a role "admin".
/// Deve ser executado *depois* do middleware `require_auth`.
pub async fn require_admin(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.role == ROLE_ADMIN {
        tracing::debug!("Admin MW: acesso concedido para {}", user.email);
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Admin MW: acesso negado para {} (role '{}')", user.email, user.role);
        Err(AppError::Forbidden(format!(
            "Role '{}' is not authorized to access this route",
            user.role
        )))
    }
}
