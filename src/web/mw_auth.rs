// src/web/mw_auth.rs
use crate::{
    error::AppError,
    models::user::User,
    services::{auth_service, user_service},
    state::AppState,
};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

// Utilizador autenticado, posto nas extensões da requisição pelo
// require_auth para os handlers protegidos lerem com Extension<CurrentUser>.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Middleware que exige um token bearer válido.
/// Recarrega o utilizador da DB em cada pedido: um token ainda válido
/// de uma conta entretanto apagada não serve.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extrai o token do cabeçalho "Authorization: Bearer <token>"
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            tracing::debug!("Autenticação MW: cabeçalho Authorization ausente ou malformado");
            AppError::Auth("Not authorized to access this route".to_string())
        })?;

    let claims = auth_service::verify_token(&state.token_keys, token)?;

    match user_service::find_user_by_id(&state.db_pool, &claims.sub).await? {
        Some(user) => {
            tracing::debug!(
                "Autenticação MW: '{}' autenticado ({}). Prosseguindo...",
                user.email, user.role
            );
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        }
        None => {
            // Token assinado por nós mas a conta já não existe
            tracing::warn!("Autenticação MW: token válido para conta inexistente {}", claims.sub);
            Err(AppError::Auth("User no longer exists".to_string()))
        }
    }
}
