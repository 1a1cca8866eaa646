use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::store::{Document, ID_FIELD};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();
        Self { id: id.into(), iat: now.timestamp(), exp }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),
}

pub fn generate_token(security: &SecurityConfig, id: &str) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    let claims = Claims::new(id, security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Check signature and expiry, returning the claims.
pub fn verify_token(security: &SecurityConfig, token: &str) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// bcrypt is CPU bound, so hashing runs on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rol {
    Admin,
    User,
}

impl Rol {
    pub const ALL: &'static [Rol] = &[Rol::Admin, Rol::User];
    pub const ADMIN_ONLY: &'static [Rol] = &[Rol::Admin];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(Rol::Admin),
            "USER" => Some(Rol::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::Admin => "ADMIN",
            Rol::User => "USER",
        }
    }
}

/// The authenticated user behind a request.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: String,
    pub nombre: String,
    pub email: String,
    pub rol: Rol,
}

impl Principal {
    /// Build from a stored user document; `None` when it lacks an id or a known role.
    pub fn from_document(document: &Document) -> Option<Self> {
        let text = |key: &str| document.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            id: text(ID_FIELD)?,
            nombre: text("nombre").unwrap_or_default(),
            email: text("email").unwrap_or_default(),
            rol: text("rol").as_deref().and_then(Rol::parse)?,
        })
    }

    pub fn has_role(&self, allowed: &[Rol]) -> bool {
        allowed.contains(&self.rol)
    }
}
