//! CORS configuration
//!
//! The frontend calls the API from another origin with the session cookie,
//! so credentials are always allowed and origins must be listed explicitly
//! in production.

use crate::config::AppConfig;
use tracing::{info, warn};

/// CORS configuration loaded from the security section
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub origins: Vec<String>,
    pub methods: Vec<String>,
    pub headers: Vec<String>,
}

impl CorsConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            origins: config.security.cors_origins.clone(),
            methods: config.security.cors_methods.clone(),
            headers: config.security.cors_headers.clone(),
        }
    }
}

/// CORS middleware
pub struct CorsMiddleware {
    config: CorsConfig,
}

impl CorsMiddleware {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: CorsConfig::from_app_config(config),
        }
    }

    pub fn get_cors_config(&self) -> &CorsConfig {
        &self.config
    }

    /// Check if CORS allows any origin
    pub fn allows_any_origin(&self) -> bool {
        self.config.origins.iter().any(|o| o == "*")
    }

    /// Validate CORS configuration
    pub fn validate_config(&self) -> Result<(), String> {
        if !self.allows_any_origin() {
            for origin in &self.config.origins {
                if !self.is_valid_origin(origin) {
                    return Err(format!("Invalid CORS origin: {}", origin));
                }
            }
        }

        for method in &self.config.methods {
            if method.parse::<warp::http::Method>().is_err() {
                return Err(format!("Invalid CORS method: {}", method));
            }
        }

        for header in &self.config.headers {
            if header.trim().is_empty() {
                return Err(format!("Invalid CORS header: {:?}", header));
            }
        }

        Ok(())
    }

    fn is_valid_origin(&self, origin: &str) -> bool {
        origin == "*" || origin.starts_with("http://") || origin.starts_with("https://")
    }

    /// Build the warp CORS filter
    pub fn build(&self) -> warp::cors::Builder {
        let mut cors = warp::cors()
            .allow_credentials(true)
            .allow_methods(self.config.methods.iter().map(String::as_str))
            .allow_headers(self.config.headers.iter().map(String::as_str))
            .max_age(3600);

        if self.allows_any_origin() {
            warn!("CORS allows any origin; list the frontend origins explicitly in production");
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allow_origins(self.config.origins.iter().map(String::as_str));
        }

        info!(origins = ?self.config.origins, "CORS configured");
        cors
    }
}
