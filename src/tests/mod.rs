//! Crate-level test suite
//!
//! - `fixtures`: recording fakes for mail, payment gateway and storage
//! - `unit`: service scenarios against the in-memory document store
//! - `integration`: full warp routes driven through `warp::test`

pub mod fixtures;
mod integration;
mod unit;

/// Test configuration and utilities
pub mod config {
    use crate::config::app_config::PasswordConfig;
    use crate::config::AppConfig;
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Initialize test logging once per process
    pub fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter("warn")
                .with_test_writer()
                .try_init();
        });
    }

    /// Development configuration with cheap hashing and no rate limiting.
    /// Uploads go to `uploads_root`.
    pub fn test_config(uploads_root: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.rate_limit.enabled = false;
        config.security.password = PasswordConfig {
            memory_cost_kib: 8,
            iterations: 1,
            parallelism: 1,
        };
        config.uploads.root_dir = uploads_root.to_string();
        config.payments.enabled = true;
        config.payments.access_token = "TEST-token".to_string();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_valid() {
        config::init();
        let config = config::test_config("/tmp/uploads");
        assert!(!config.rate_limit.enabled);
        assert!(config.payments.enabled);
        assert!(config.validate_config().is_ok());
    }
}
