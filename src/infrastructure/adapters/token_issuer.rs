//! Token issuer adapter for JWT token generation and validation
//!
//! Session tokens and confirmation/reset tokens use different secrets and
//! lifetimes. Confirmation tokens also carry a purpose so a reset link can
//! never confirm an account and vice versa.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::app_config::JwtConfig;
use crate::shared::error::{AppError, AppResult};

/// Claims of a login session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Client ID
    pub sub: String,
    pub email: String,
    pub iss: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

/// What a confirmation-style token may be used for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Confirmation,
    PasswordReset,
}

/// Claims of an emailed confirmation or password reset token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmationClaims {
    /// Client ID
    pub sub: String,
    pub purpose: TokenPurpose,
    pub iss: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

/// Issues and verifies HS256 tokens
pub struct TokenIssuerAdapter {
    config: JwtConfig,
}

impl TokenIssuerAdapter {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.leeway = 0;
        validation
    }

    fn timestamps(ttl_seconds: u64) -> (usize, usize) {
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl_seconds as i64);
        (now.timestamp() as usize, exp.timestamp() as usize)
    }

    /// Issue a session token for an authenticated client
    pub fn issue_session(&self, client_id: &str, email: &str) -> AppResult<String> {
        let (iat, exp) = Self::timestamps(self.config.session_ttl_seconds);
        let claims = SessionClaims {
            sub: client_id.to_string(),
            email: email.to_string(),
            iss: self.config.issuer.clone(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.session_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    pub fn verify_session(&self, token: &str) -> AppResult<SessionClaims> {
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.session_secret.as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Session token rejected");
            AppError::Unauthorized("invalid or expired session".to_string())
        })
    }

    /// Issue a confirmation or password reset token
    pub fn issue_confirmation(&self, client_id: &str, purpose: TokenPurpose) -> AppResult<String> {
        let (iat, exp) = Self::timestamps(self.config.confirmation_ttl_seconds);
        let claims = ConfirmationClaims {
            sub: client_id.to_string(),
            purpose,
            iss: self.config.issuer.clone(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.confirmation_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign confirmation token: {}", e)))
    }

    /// Verify a confirmation-style token and return the client ID it binds
    pub fn verify_confirmation(&self, token: &str, purpose: TokenPurpose) -> AppResult<String> {
        let claims = decode::<ConfirmationClaims>(
            token,
            &DecodingKey::from_secret(self.config.confirmation_secret.as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Confirmation token rejected");
            AppError::Unauthorized("invalid or expired token".to_string())
        })?;

        if claims.purpose != purpose {
            return Err(AppError::Unauthorized("token was issued for another purpose".to_string()));
        }
        Ok(claims.sub)
    }
}
