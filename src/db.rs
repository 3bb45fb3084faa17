// src/db.rs
use crate::error::AppResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub async fn create_db_pool() -> AppResult<SqlitePool> {
    dotenvy::dotenv().ok(); // Carrega .env
    let database_url = std::env::var("DATABASE_URL")?; // Lê URL da DB

    tracing::info!("Ligando à base de dados: {}", database_url);

    // Opções de conexão (criar se não existir, timeout)
    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    // Cria o pool (conjunto de conexões reutilizáveis)
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Executando migrações da base de dados...");
    // Executa automaticamente os ficheiros SQL em ./migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrações concluídas.");

    Ok(pool)
}

// Pool em memória para testes, com o mesmo esquema das migrações.
// max_connections(1) porque cada conexão :memory: teria uma DB própria.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("falha ao criar pool de teste");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("falha ao migrar DB de teste");
    pool
}
