// src/main.rs

// --- Declaração dos Módulos ---
mod db;
mod error;
mod images;
mod models;
mod notify;
mod services;
mod state;
mod web;

// --- Imports ---
use crate::images::DiskImageStore;
use crate::notify::LogMailer;
use crate::services::auth_service::TokenKeys;
use crate::state::AppState;
use axum::serve;
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                env::var("RUST_LOG")
                    .unwrap_or_else(|_| "cantina=debug,tower_http=info,sqlx=warn".into())
                    .into()
            }),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor da cantina...");

    // --- Configuração da Base de Dados ---
    let db_pool = match db::create_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Falha crítica ao inicializar a base de dados: {}", e);
            return Err(anyhow::anyhow!("Falha ao conectar/migrar DB: {}", e));
        }
    };

    // --- Chaves do Token de Sessão ---
    let token_keys = TokenKeys::from_env()
        .map_err(|e| anyhow::anyhow!("!!! Variável de ambiente JWT_SECRET não definida: {}", e))?;
    tracing::info!("🔑 Chaves de token configuradas.");

    // --- Colaboradores Externos (email e imagens) ---
    let upload_dir =
        PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));
    tokio::fs::create_dir_all(&upload_dir).await?;

    // --- Criação do Estado da Aplicação ---
    let app_state = AppState {
        db_pool: db_pool.clone(),
        token_keys: Arc::new(token_keys),
        mailer: Arc::new(LogMailer),
        images: Arc::new(DiskImageStore::new(upload_dir.clone())),
    };

    // --- Configuração do Endereço e Listener ---
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("📡 Servidor escutando em http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao iniciar listener na porta {}: {}", port, e);
            return Err(e.into());
        }
    };

    // --- Criação do Router e Aplicação das Camadas (Middlewares) ---
    tracing::info!("🛠️ Construindo router e aplicando middlewares...");
    let app = web::routes::create_router(app_state, &upload_dir)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    tracing::info!("✅ Router e middlewares configurados.");

    // --- Início do Servidor ---
    tracing::info!("👂 Servidor pronto para aceitar conexões...");
    if let Err(e) = serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    // Fecha o pool para os WALs do SQLite serem descarregados
    db_pool.close().await;
    tracing::info!("🚪 Servidor desligado.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao instalar handler de Ctrl+C: {}", e);
        return;
    }
    tracing::info!("🛑 Sinal de paragem recebido, terminando pedidos em curso...");
}
