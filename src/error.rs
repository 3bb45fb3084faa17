// src/error.rs
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVar(#[from] std::env::VarError),

    // Input em falta ou fora do intervalo permitido
    #[error("{0}")]
    Validation(String),

    // Recurso inexistente (ou não pertencente ao utilizador)
    #[error("{0}")]
    NotFound(String),

    // Violação de regra de negócio (duplicado, item indisponível, etc.)
    #[error("{0}")]
    Conflict(String),

    // Credencial em falta, inválida ou expirada
    #[error("{0}")]
    Auth(String),

    // Autenticado mas sem a role necessária
    #[error("{0}")]
    Forbidden(String),

    // Falha num colaborador externo (armazenamento de imagens, email)
    #[error("{0}")]
    Dependency(String),

    #[error("Erro ao processar password")]
    PasswordHashing,

    #[error("Erro interno inesperado")]
    Internal,
}

// Converte AppError no envelope JSON uniforme {success, message, error?}
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Loga o erro detalhado no servidor
        tracing::error!("Erro processado: {:?}", self);

        let (status, user_message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Conflitos de negócio respondem 400, como o comportamento observado
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Dependency(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Sqlx(_) | AppError::SqlxMigrate(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_string(),
            ),
            AppError::EnvVar(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
            ),
            AppError::PasswordHashing => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process credentials".to_string(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_string(),
            ),
        };

        let mut body = json!({
            "success": false,
            "message": user_message,
        });

        // O detalhe técnico só sai em ambientes de não-produção
        if status == StatusCode::INTERNAL_SERVER_ERROR && !is_production() {
            body["error"] = json!(self.to_string());
        }

        (status, Json(body)).into_response()
    }
}

fn is_production() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false)
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
