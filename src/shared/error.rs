//! Error handling module
//!
//! This module provides centralized error handling for the application.
//! Every variant maps to a stable machine-readable code so that API callers
//! never have to parse the human-readable message.

use serde_json::Value;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("External service failure: {0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    Store(String),

    #[error("JSON serialization error: {0}")]
    Json(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable error code exposed to API callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIGURATION",
            AppError::Validation(_) => "VALIDATION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_FAILURE",
            AppError::Store(_) => "STORAGE",
            AppError::Json(_) => "BAD_REQUEST",
            AppError::RateLimit => "RATE_LIMITED",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Message safe to show to API callers.
    ///
    /// Infrastructure failures are collapsed into a generic message; the
    /// detail is only logged.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Config(_) | AppError::Store(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Convert to a JSON error body
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.public_message()
            }
        })
    }

    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> warp::http::StatusCode {
        match self {
            AppError::Validation(_) | AppError::Json(_) => warp::http::StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => warp::http::StatusCode::NOT_FOUND,
            AppError::Conflict(_) => warp::http::StatusCode::CONFLICT,
            AppError::Unauthorized(_) => warp::http::StatusCode::UNAUTHORIZED,
            AppError::RateLimit => warp::http::StatusCode::TOO_MANY_REQUESTS,
            AppError::ExternalService(_) => warp::http::StatusCode::BAD_GATEWAY,
            _ => warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the document store itself failed
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, AppError::Store(_))
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;

// Implement warp::reject::Reject for AppError
impl warp::reject::Reject for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalService(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
