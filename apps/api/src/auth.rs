//! JWT authentication module.
//!
//! Token issuance and validation, plus the extractors that guard routes.
//!
//! ## Guarding a Route
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Authorization: Bearer <jwt>                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RequireAuth        missing header        → 401 Token não fornecido    │
//! │       │             bad signature/expired → 401 Token inválido ...     │
//! │       ▼                                                                 │
//! │  RequireAdmin       load user by `sub`                                 │
//! │       │             unknown user          → 403                        │
//! │       │             papel != admin        → 403                        │
//! │       ▼                                                                 │
//! │  handler(RequireAdmin(user), ...)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The role comes from the stored user, not from the token, so a signed
//! token keeps no privileges once its user is gone or demoted.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;
use kpr_core::{Role, User};

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: i64,

    pub email: String,

    /// Role at issue time. Informational; authorization reloads the user.
    pub papel: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Issue a token for a user.
    ///
    /// Fails with `Internal` when the lifetime pushes `exp` past what a
    /// timestamp can hold.
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.lifetime_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ApiError::Internal(format!(
                    "token lifetime out of range: {}s",
                    self.lifetime_secs
                ))
            })?;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            papel: user.papel,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        self.sign(&claims)
    }

    /// Sign arbitrary claims with this manager's key.
    pub fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!(error = %e, "Rejected token");
                ApiError::Unauthorized("Token inválido ou expirado".to_string())
            })
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Extractors
// =============================================================================

/// Extractor that requires any valid token.
pub struct RequireAuth(pub Claims);

/// Extractor that requires a token whose user is an admin.
pub struct RequireAdmin(pub User);

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::Unauthorized("Token não fornecido".to_string()))?;

        let claims = state.jwt.validate(token)?;
        Ok(RequireAuth(claims))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(claims) = RequireAuth::from_request_parts(parts, state).await?;

        let user = state.db.users().find_by_id(claims.sub).await?;

        match user {
            Some(user) if user.papel.is_admin() => Ok(RequireAdmin(user)),
            _ => {
                warn!(sub = claims.sub, "Non-admin token on admin route");
                Err(ApiError::Forbidden(
                    "Acesso restrito ao administrador".to_string(),
                ))
            }
        }
    }
}
