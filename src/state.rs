// src/state.rs
use crate::images::ImageStore;
use crate::notify::Mailer;
use crate::services::auth_service::TokenKeys;
use sqlx::SqlitePool;
use std::sync::Arc;

// Estado partilhado da aplicação: pool da DB e colaboradores externos.
// Tudo clonável barato (Arc) para viver dentro do Router.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub token_keys: Arc<TokenKeys>,
    pub mailer: Arc<dyn Mailer>,
    pub images: Arc<dyn ImageStore>,
}

// Permite extrair o pool da DB diretamente
impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.db_pool.clone()
    }
}
