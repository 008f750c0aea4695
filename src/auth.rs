//! Password hashing, access tokens and permission bits.
//!
//! Passwords are stored as bcrypt hashes. Access tokens are HMAC-signed JWTs whose
//! `sub` claim is the username; the [`crate::middleware::auth::CurrentUser`]
//! extractor turns a bearer token back into a user row.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use thiserror::Error;

use crate::config::AppConfig;
use crate::dal;
use crate::types::UserCredentials;

/// Token lifetime when the caller does not ask for one.
pub const DEFAULT_TOKEN_MINUTES: i64 = 15;

/// Permission bits carried by roles. A user's permissions are the OR of its roles.
pub mod permissions {
    pub const EDIT_LEXICON: i64 = 1;
    pub const MANAGE_USERS: i64 = 1 << 1;
    pub const MANAGE_ROLES: i64 = 1 << 2;
    pub const ALL: i64 = EDIT_LEXICON | MANAGE_USERS | MANAGE_ROLES;

    pub fn has(granted: i64, required: i64) -> bool {
        granted & required == required
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("token encoding failed: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
    #[error("missing bearer token")]
    MissingToken,
    #[error("token subject does not match an active user")]
    UnknownSubject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies access tokens with the configured secret and algorithm.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, algorithm: Algorithm, lifetime_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            default_lifetime: Duration::minutes(lifetime_minutes),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self::new(&cfg.jwt.secret_key, cfg.jwt.algorithm()?, cfg.jwt.access_token_expire_minutes))
    }

    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.create_access_token(subject, Some(self.default_lifetime))
    }

    /// Signs a token for `subject`; without `expires_in` it lives for [`DEFAULT_TOKEN_MINUTES`].
    pub fn create_access_token(&self, subject: &str, expires_in: Option<Duration>) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires = now + expires_in.unwrap_or_else(|| Duration::minutes(DEFAULT_TOKEN_MINUTES));
        let claims = Claims { sub: subject.to_string(), iat: now.timestamp(), exp: expires.timestamp() };
        encode(&Header::new(self.algorithm), &claims, &self.encoding).map_err(AuthError::Encoding)
    }

    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }
}

/// Hashes on the blocking pool.
pub async fn hash_password(plain: String, cost: u32) -> anyhow::Result<String> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| anyhow::anyhow!("hash task join error: {}", e))?
        .map_err(AuthError::from)?;
    Ok(hashed)
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(plain: String, hashed: String) -> bool {
    match tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hashed)).await {
        Ok(Ok(matches)) => matches,
        Ok(Err(e)) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            false
        }
        Err(e) => {
            tracing::error!("verify task join error: {}", e);
            false
        }
    }
}

/// Looks up an active user and checks the password. Unknown users and wrong
/// passwords are indistinguishable to the caller.
pub async fn authenticate_user(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
) -> sqlx::Result<Option<UserCredentials>> {
    let Some(credentials) = dal::users::get_credentials(conn, username).await? else {
        return Ok(None);
    };
    if verify_password(password.to_string(), credentials.hashed_password.clone()).await {
        Ok(Some(credentials))
    } else {
        Ok(None)
    }
}

pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
