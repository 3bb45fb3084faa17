// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::User,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::Internal
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHashing
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt...");
        bcrypt::hash(&password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::Internal
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHashing
    })
}

// --- Token de sessão (bearer JWT) ---

// Claims que viajam dentro do token: id, email e role do utilizador.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

// Chaves HS256 derivadas do JWT_SECRET, criadas uma vez no arranque.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expire_hours: i64,
}

impl TokenKeys {
    pub fn from_env() -> AppResult<Self> {
        let secret = std::env::var("JWT_SECRET")?;
        let expire_hours = std::env::var("JWT_EXPIRE_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(24);
        Ok(Self::new(secret.as_bytes(), expire_hours))
    }

    pub fn new(secret: &[u8], expire_hours: i64) -> Self {
        TokenKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expire_hours,
        }
    }
}

/// Assina um token para o utilizador dado.
pub fn sign_token(keys: &TokenKeys, user: &User) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(keys.expire_hours)).timestamp(),
    };
    encode(&Header::default(), &claims, &keys.encoding).map_err(|e| {
        tracing::error!("Erro ao assinar token: {:?}", e);
        AppError::Internal
    })
}

/// Valida o token e devolve os claims; qualquer falha vira AuthError uniforme.
pub fn verify_token(keys: &TokenKeys, token: &str) -> AppResult<Claims> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Token rejeitado: {:?}", e);
            AppError::Auth("Invalid or expired token".to_string())
        })
}

// --- Token de recuperação de senha ---

/// Gera o token de reset: devolve (token em claro para o email, hash para a DB).
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);
    let hashed = hash_reset_token(&raw);
    (raw, hashed)
}

/// Só o hash SHA-256 do token é guardado na DB.
pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Validade de 1 hora.
pub fn reset_token_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::hours(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;

    fn sample_user() -> User {
        User {
            id: "u-1".into(),
            name: "Ana".into(),
            email: "ana@campus.edu".into(),
            student_id: "S-100".into(),
            phone: "900000000".into(),
            password_hash: "x".into(),
            role: "student".into(),
            avatar_url: None,
            avatar_public_id: None,
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_roundtrip_preserves_claims() {
        let keys = TokenKeys::new(b"segredo-de-teste-bastante-longo", 24);
        let token = sign_token(&keys, &sample_user()).unwrap();
        let claims = verify_token(&keys, &token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email, "ana@campus.edu");
        assert_eq!(claims.role, "student");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let keys = TokenKeys::new(b"segredo-de-teste-bastante-longo", 24);
        let outras = TokenKeys::new(b"outro-segredo-completamente-diferente", 24);
        let token = sign_token(&keys, &sample_user()).unwrap();
        assert!(verify_token(&outras, &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = TokenKeys::new(b"segredo-de-teste-bastante-longo", 24);
        assert!(verify_token(&keys, "nao-e-um-jwt").is_err());
    }

    #[test]
    fn reset_token_hash_matches_raw() {
        let (raw, hashed) = generate_reset_token();
        assert_eq!(raw.len(), 64); // 32 bytes em hex
        assert_eq!(hash_reset_token(&raw), hashed);
        // dois tokens nunca devem colidir
        let (raw2, _) = generate_reset_token();
        assert_ne!(raw, raw2);
    }

    #[tokio::test]
    async fn password_hash_and_verify() {
        let hash = hash_password("super-secreta").await.unwrap();
        assert!(verify_password("super-secreta", &hash).await.unwrap());
        assert!(!verify_password("errada", &hash).await.unwrap());
    }
}
