// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{User, DEFINED_ROLES, ROLE_STUDENT},
    services::auth_service,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, student_id, phone, password_hash, role, \
     avatar_url, avatar_public_id, reset_token_hash, reset_token_expires, \
     created_at, updated_at";

/// Busca um utilizador pelo seu ID.
pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por ID: {}", user_id);
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
    ))
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

/// Busca um utilizador pelo email (case-insensitive, via COLLATE NOCASE).
pub async fn find_user_by_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por email: {}", email);
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
    ))
    .bind(email)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

/// Regista um utilizador novo com role 'student'.
/// Rejeita duplicados nomeando o campo em conflito (email ou student ID).
pub async fn register_user(
    db_pool: &SqlitePool,
    name: &str,
    email: &str,
    student_id: &str,
    phone: &str,
    raw_password: &str,
) -> AppResult<User> {
    tracing::info!("Tentando registar utilizador: {}", email);

    if name.trim().is_empty()
        || email.trim().is_empty()
        || student_id.trim().is_empty()
        || phone.trim().is_empty()
        || raw_password.is_empty()
    {
        return Err(AppError::Validation(
            "Please provide all required fields".to_string(),
        ));
    }
    if raw_password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Verifica duplicados ANTES de inserir, para poder nomear o campo
    let existing = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 OR student_id = ?2 LIMIT 1"
    ))
    .bind(email)
    .bind(student_id)
    .fetch_optional(db_pool)
    .await?;

    if let Some(existing) = existing {
        let field = if existing.email.eq_ignore_ascii_case(email) {
            "Email"
        } else {
            "Student ID"
        };
        tracing::warn!("Registo rejeitado: {} já usado ({})", field, email);
        return Err(AppError::Conflict(format!("{field} already registered")));
    }

    let password_hash = auth_service::hash_password(raw_password).await?;
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, name, email, student_id, phone, password_hash, role, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(&id)
    .bind(name)
    .bind(email)
    .bind(student_id)
    .bind(phone)
    .bind(&password_hash)
    .bind(ROLE_STUDENT)
    .bind(now)
    .execute(db_pool)
    .await?;

    tracing::info!("✅ Utilizador '{}' registado com sucesso.", email);
    find_user_by_id(db_pool, &id)
        .await?
        .ok_or(AppError::Internal)
}

/// Atualiza nome/telefone do próprio utilizador (campos opcionais).
pub async fn update_profile(
    db_pool: &SqlitePool,
    user_id: &str,
    name: Option<&str>,
    phone: Option<&str>,
) -> AppResult<User> {
    let user = find_user_by_id(db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or(&user.name);
    let phone = phone.filter(|p| !p.trim().is_empty()).unwrap_or(&user.phone);
    let now = Utc::now();

    sqlx::query("UPDATE users SET name = ?1, phone = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(name)
        .bind(phone)
        .bind(now)
        .bind(user_id)
        .execute(db_pool)
        .await?;

    tracing::info!("✅ Perfil atualizado para user: {}", user_id);
    find_user_by_id(db_pool, user_id)
        .await?
        .ok_or(AppError::Internal)
}

/// Troca a senha validando a atual primeiro.
pub async fn change_password(
    db_pool: &SqlitePool,
    user_id: &str,
    current_password: &str,
    new_password: &str,
) -> AppResult<()> {
    if current_password.is_empty() || new_password.is_empty() {
        return Err(AppError::Validation(
            "Please provide current and new password".to_string(),
        ));
    }
    if new_password.len() < 8 {
        return Err(AppError::Validation(
            "New password must be at least 8 characters".to_string(),
        ));
    }

    let user = find_user_by_id(db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !auth_service::verify_password(current_password, &user.password_hash).await? {
        tracing::warn!("Senha atual incorreta para user: {}", user_id);
        return Err(AppError::Auth("Current password is incorrect".to_string()));
    }

    set_password(db_pool, user_id, new_password).await?;
    tracing::info!("✅ Senha alterada com sucesso para user: {}", user_id);
    Ok(())
}

/// Grava um hash novo de senha (usada pelo change e pelo reset).
pub async fn set_password(db_pool: &SqlitePool, user_id: &str, raw_password: &str) -> AppResult<()> {
    let password_hash = auth_service::hash_password(raw_password).await?;
    let now = Utc::now();
    sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(&password_hash)
        .bind(now)
        .bind(user_id)
        .execute(db_pool)
        .await?;
    Ok(())
}

// --- Token de recuperação de senha ---

pub async fn store_reset_token(
    db_pool: &SqlitePool,
    user_id: &str,
    token_hash: &str,
    expires: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE users SET reset_token_hash = ?1, reset_token_expires = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(token_hash)
    .bind(expires)
    .bind(Utc::now())
    .bind(user_id)
    .execute(db_pool)
    .await?;
    Ok(())
}

pub async fn clear_reset_token(db_pool: &SqlitePool, user_id: &str) -> AppResult<()> {
    sqlx::query(
        "UPDATE users SET reset_token_hash = NULL, reset_token_expires = NULL, updated_at = ?1 WHERE id = ?2",
    )
    .bind(Utc::now())
    .bind(user_id)
    .execute(db_pool)
    .await?;
    Ok(())
}

/// Procura o utilizador cujo token (já hasheado) ainda está válido.
pub async fn find_user_by_reset_token(
    db_pool: &SqlitePool,
    token_hash: &str,
) -> AppResult<Option<User>> {
    let now = Utc::now();
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE reset_token_hash = ?1 AND reset_token_expires > ?2"
    ))
    .bind(token_hash)
    .bind(now)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

// --- Avatar ---

pub async fn set_avatar(
    db_pool: &SqlitePool,
    user_id: &str,
    url: &str,
    public_id: &str,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE users SET avatar_url = ?1, avatar_public_id = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(url)
    .bind(public_id)
    .bind(Utc::now())
    .bind(user_id)
    .execute(db_pool)
    .await?;
    Ok(())
}

pub async fn clear_avatar(db_pool: &SqlitePool, user_id: &str) -> AppResult<()> {
    sqlx::query(
        "UPDATE users SET avatar_url = NULL, avatar_public_id = NULL, updated_at = ?1 WHERE id = ?2",
    )
    .bind(Utc::now())
    .bind(user_id)
    .execute(db_pool)
    .await?;
    Ok(())
}

// --- Funções de Admin ---

/// Lista utilizadores com filtros de role/pesquisa e paginação.
pub async fn find_all_users(
    db_pool: &SqlitePool,
    role: Option<&str>,
    search: Option<&str>,
    page: i64,
    limit: i64,
) -> AppResult<(Vec<User>, i64)> {
    tracing::debug!("Buscando utilizadores (role={:?}, search={:?})", role, search);

    let mut where_sql = String::from("WHERE 1=1");
    if role.is_some() {
        where_sql.push_str(" AND role = ?");
    }
    if search.is_some() {
        where_sql.push_str(" AND (name LIKE ? OR email LIKE ? OR student_id LIKE ?)");
    }

    let pattern = search.map(|s| format!("%{s}%"));

    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users {where_sql} ORDER BY created_at DESC LIMIT ? OFFSET ?"
    );
    let mut query = sqlx::query_as::<_, User>(&sql);
    if let Some(role) = role {
        query = query.bind(role);
    }
    if let Some(pattern) = &pattern {
        query = query.bind(pattern).bind(pattern).bind(pattern);
    }
    let users = query
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(db_pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM users {where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(role) = role {
        count_query = count_query.bind(role);
    }
    if let Some(pattern) = &pattern {
        count_query = count_query.bind(pattern).bind(pattern).bind(pattern);
    }
    let total = count_query.fetch_one(db_pool).await?;

    tracing::debug!("Encontrados {} utilizadores (total {}).", users.len(), total);
    Ok((users, total))
}

/// Altera a role de um utilizador (apenas 'student' ou 'admin').
pub async fn update_user_role(db_pool: &SqlitePool, user_id: &str, role: &str) -> AppResult<User> {
    if !DEFINED_ROLES.contains(&role) {
        return Err(AppError::Validation("Invalid role".to_string()));
    }

    let rows_affected =
        sqlx::query("UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(role)
            .bind(Utc::now())
            .bind(user_id)
            .execute(db_pool)
            .await?
            .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao alterar role: utilizador '{}' não encontrado.", user_id);
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!("✅ Role '{}' atribuída ao user {}", role, user_id);
    find_user_by_id(db_pool, user_id)
        .await?
        .ok_or(AppError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn register_rejects_duplicate_email_naming_the_field() {
        let pool = test_pool().await;
        register_user(&pool, "Ana", "ana@campus.edu", "S-1", "911111111", "password1")
            .await
            .unwrap();

        let err = register_user(&pool, "Bia", "ANA@campus.edu", "S-2", "922222222", "password2")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Email already registered"));

        // Nenhuma linha nova foi criada
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_student_id_naming_the_field() {
        let pool = test_pool().await;
        register_user(&pool, "Ana", "ana@campus.edu", "S-1", "911111111", "password1")
            .await
            .unwrap();

        let err = register_user(&pool, "Bia", "bia@campus.edu", "S-1", "922222222", "password2")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Student ID already registered"));
    }

    #[tokio::test]
    async fn register_requires_all_fields() {
        let pool = test_pool().await;
        let err = register_user(&pool, "Ana", "", "S-1", "911111111", "password1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn reset_token_lookup_respects_expiry() {
        let pool = test_pool().await;
        let user = register_user(&pool, "Ana", "ana@campus.edu", "S-1", "911111111", "password1")
            .await
            .unwrap();

        let (raw, hashed) = crate::services::auth_service::generate_reset_token();

        // Token válido
        store_reset_token(&pool, &user.id, &hashed, Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        let found = find_user_by_reset_token(&pool, &crate::services::auth_service::hash_reset_token(&raw))
            .await
            .unwrap();
        assert!(found.is_some());

        // Token expirado
        store_reset_token(&pool, &user.id, &hashed, Utc::now() - chrono::Duration::minutes(1))
            .await
            .unwrap();
        let found = find_user_by_reset_token(&pool, &hashed).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn update_role_validates_and_applies() {
        let pool = test_pool().await;
        let user = register_user(&pool, "Ana", "ana@campus.edu", "S-1", "911111111", "password1")
            .await
            .unwrap();

        let err = update_user_role(&pool, &user.id, "superuser").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let updated = update_user_role(&pool, &user.id, "admin").await.unwrap();
        assert_eq!(updated.role, "admin");
    }
}
