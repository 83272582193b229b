//! Configuration validation module
//!
//! Cross-field checks that the per-section validator derives cannot express.

use crate::config::app_config::{
    JwtConfig, MailConfig, PaymentsConfig, RateLimitConfig, SecurityConfig, SessionConfig,
    StoreBackend, StoreConfig,
};
use crate::config::AppConfig;
use crate::shared::error::AppError;

/// Configuration validator for additional validation logic
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the complete configuration
    pub fn validate_config(config: &AppConfig) -> crate::Result<()> {
        Self::validate_security_config(&config.security)?;
        Self::validate_jwt_config(&config.security.jwt)?;
        Self::validate_session_config(&config.session)?;
        Self::validate_rate_limit_config(&config.rate_limit)?;
        Self::validate_store_config(&config.store)?;
        Self::validate_mail_config(&config.mail)?;
        Self::validate_payments_config(&config.payments)?;

        Ok(())
    }

    /// Validate security configuration
    fn validate_security_config(security: &SecurityConfig) -> crate::Result<()> {
        if security.cors_origins.iter().any(|o| o == "*") {
            tracing::warn!(
                "CORS allows any origin while credentials are enabled; restrict cors_origins in production"
            );
        }

        for method in &security.cors_methods {
            if !["GET", "POST", "PUT", "DELETE", "OPTIONS", "PATCH"].contains(&method.as_str()) {
                return Err(AppError::Validation(format!("Invalid CORS method: {}", method)));
            }
        }

        Ok(())
    }

    fn validate_jwt_config(jwt: &JwtConfig) -> crate::Result<()> {
        if jwt.session_secret == jwt.confirmation_secret {
            return Err(AppError::Validation(
                "Session and confirmation secrets must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Browsers drop `SameSite=None` cookies that are not `Secure`
    fn validate_session_config(session: &SessionConfig) -> crate::Result<()> {
        match session.same_site.as_str() {
            "Strict" | "Lax" => Ok(()),
            "None" if session.secure => Ok(()),
            "None" => Err(AppError::Validation(
                "SameSite=None session cookies must be Secure".to_string(),
            )),
            other => Err(AppError::Validation(format!("Invalid SameSite value: {}", other))),
        }
    }

    /// Validate rate limiting configuration
    fn validate_rate_limit_config(rate_limit: &RateLimitConfig) -> crate::Result<()> {
        if rate_limit.enabled && rate_limit.burst_size > rate_limit.requests_per_minute {
            return Err(AppError::Validation(
                "Burst size cannot be greater than requests per minute".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_store_config(store: &StoreConfig) -> crate::Result<()> {
        if store.backend == StoreBackend::Redis {
            match store.redis_url.as_deref() {
                Some(url) if url.starts_with("redis://") || url.starts_with("rediss://") => {}
                Some(url) => {
                    return Err(AppError::Validation(format!("Invalid Redis URL: {}", url)));
                }
                None => {
                    return Err(AppError::Validation(
                        "Redis store backend requires store.redis_url".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn validate_mail_config(mail: &MailConfig) -> crate::Result<()> {
        if mail.enabled {
            let missing = [
                ("service_id", &mail.service_id),
                ("template_id", &mail.template_id),
                ("public_key", &mail.public_key),
                ("private_key", &mail.private_key),
            ]
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect::<Vec<_>>();

            if !missing.is_empty() {
                return Err(AppError::Validation(format!(
                    "Mail is enabled but missing: {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    fn validate_payments_config(payments: &PaymentsConfig) -> crate::Result<()> {
        if payments.enabled && payments.access_token.trim().is_empty() {
            return Err(AppError::Validation(
                "Payments are enabled but payments.access_token is empty".to_string(),
            ));
        }
        Ok(())
    }
}
