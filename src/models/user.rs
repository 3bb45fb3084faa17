// src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Representa um utilizador lido da tabela 'users'.
// Os campos sensíveis nunca saem na serialização.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String, // "student" ou "admin"
    #[serde(rename = "avatar")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing)]
    pub avatar_public_id: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_ADMIN: &str = "admin";
pub const DEFINED_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_ADMIN];

// --- Structs para os corpos JSON das rotas de auth/utilizador ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordBody {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileBody {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleBody {
    #[serde(default)]
    pub role: String,
}

// Filtros do GET /api/users (admin)
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
