//! Per-client rate limiting

use std::num::NonZeroU32;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::debug;

use crate::config::app_config::RateLimitConfig;
use crate::shared::error::{AppError, AppResult};

/// Tracked clients above which idle entries are dropped
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Token bucket per client IP
pub struct RateLimitMiddleware {
    limiter: Option<DefaultKeyedRateLimiter<String>>,
}

impl RateLimitMiddleware {
    pub fn new(config: &RateLimitConfig) -> Self {
        if !config.enabled {
            return Self { limiter: None };
        }

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(per_minute);
        let quota = Quota::per_minute(per_minute).allow_burst(burst);

        Self {
            limiter: Some(RateLimiter::keyed(quota)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Take one token for `client_ip`
    pub fn check(&self, client_ip: &str) -> AppResult<()> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        if limiter.len() > MAX_TRACKED_CLIENTS {
            limiter.retain_recent();
            debug!(tracked = limiter.len(), "Pruned idle rate limit entries");
        }

        limiter
            .check_key(&client_ip.to_string())
            .map_err(|_| AppError::RateLimit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(requests_per_minute: u32, burst_size: u32, enabled: bool) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_minute,
            burst_size,
            enabled,
        }
    }

    #[test]
    fn test_burst_then_reject() {
        let middleware = RateLimitMiddleware::new(&config(60, 2, true));
        assert!(middleware.check("10.0.0.1").is_ok());
        assert!(middleware.check("10.0.0.1").is_ok());
        assert_eq!(middleware.check("10.0.0.1"), Err(AppError::RateLimit));
    }

    #[test]
    fn test_clients_are_limited_separately() {
        let middleware = RateLimitMiddleware::new(&config(60, 1, true));
        assert!(middleware.check("10.0.0.1").is_ok());
        assert!(middleware.check("10.0.0.2").is_ok());
        assert!(middleware.check("10.0.0.1").is_err());
    }

    #[test]
    fn test_disabled_never_limits() {
        let middleware = RateLimitMiddleware::new(&config(1, 1, false));
        assert!(!middleware.is_enabled());
        for _ in 0..10 {
            assert!(middleware.check("10.0.0.1").is_ok());
        }
    }
}
