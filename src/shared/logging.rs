//! Logging utilities module
//!
//! This module provides centralized logging functionality and utilities.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Logging utilities for the application
pub struct LoggingUtils;

impl LoggingUtils {
    /// Initialize logging with the specified configuration.
    ///
    /// `RUST_LOG` wins over the configured level when it is set.
    pub fn initialize(level: &str, format: &str, structured: bool) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let builder = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(structured)
            .with_thread_ids(structured)
            .with_file(structured)
            .with_line_number(structured)
            .with_ansi(false);

        let result = if format.eq_ignore_ascii_case("json") {
            tracing::subscriber::set_global_default(builder.json().finish())
        } else {
            tracing::subscriber::set_global_default(builder.finish())
        };

        result.map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))
    }

    /// Log an incoming GraphQL request
    pub fn log_graphql_request(
        request_id: &str,
        operation: Option<&str>,
        client_ip: &str,
        authenticated: bool,
    ) {
        info!(
            request_id = %request_id,
            operation = operation.unwrap_or("anonymous"),
            client_ip = %client_ip,
            authenticated = authenticated,
            "Processing GraphQL request"
        );
    }

    /// Log a completed request
    pub fn log_success(request_id: &str, operation: &str, duration_ms: u64) {
        info!(
            request_id = %request_id,
            operation = %operation,
            duration_ms = %duration_ms,
            "Request completed successfully"
        );
    }

    /// Log a request that finished with errors
    pub fn log_error(request_id: &str, operation: &str, error: &str, duration_ms: u64) {
        error!(
            request_id = %request_id,
            operation = %operation,
            error = %error,
            duration_ms = %duration_ms,
            "Request failed"
        );
    }

    /// Log security events such as failed logins
    pub fn log_security_event(event_type: &str, details: &str, client_ip: &str) {
        warn!(
            event_type = %event_type,
            details = %details,
            client_ip = %client_ip,
            "Security event detected"
        );
    }

    /// Log rate limiting events
    pub fn log_rate_limit(client_ip: &str, route: &str) {
        warn!(
            client_ip = %client_ip,
            route = %route,
            "Rate limit exceeded"
        );
    }

    /// Generate a unique request ID
    pub fn generate_request_id() -> String {
        format!("req_{}", Uuid::new_v4().simple())
    }
}
