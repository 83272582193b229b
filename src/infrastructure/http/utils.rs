//! HTTP utilities - Common helper functions
//!
//! Client IP resolution and the `with_*` filters that inject shared state
//! into handlers.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use warp::Filter;

use crate::application::services::AppServices;
use crate::application::use_cases::HealthCheckUseCase;
use crate::config::AppConfig;
use crate::infrastructure::adapters::MonitoringAdapter;
use crate::middleware::{RateLimitMiddleware, SecurityHeadersMiddleware};

const FALLBACK_IP: &str = "127.0.0.1";

/// Resolve the client IP from a forwarded header or the socket address.
///
/// The forwarded value is only honoured when `X-Forwarded-For` is listed as
/// a trusted proxy header; otherwise the peer address wins.
pub fn extract_and_validate_client_ip(forwarded: Option<&str>, remote: Option<SocketAddr>, config: &AppConfig) -> String {
    let trust_forwarded = config
        .security
        .trusted_proxy_headers
        .iter()
        .any(|h| h.eq_ignore_ascii_case("x-forwarded-for"));

    if trust_forwarded {
        let first = forwarded
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .and_then(|value| value.parse::<IpAddr>().ok());
        if let Some(ip) = first {
            return ip.to_string();
        }
    }

    remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| FALLBACK_IP.to_string())
}

/// Filter extracting the resolved client IP
pub fn with_client_ip(config: AppConfig) -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    let config = Arc::new(config);
    warp::header::optional::<String>("x-forwarded-for")
        .and(warp::addr::remote())
        .map(move |forwarded: Option<String>, remote: Option<SocketAddr>| {
            extract_and_validate_client_ip(forwarded.as_deref(), remote, &config)
        })
}

pub fn with_services(services: AppServices) -> impl Filter<Extract = (AppServices,), Error = Infallible> + Clone {
    warp::any().map(move || services.clone())
}

pub fn with_health_use_case(
    health_use_case: Arc<HealthCheckUseCase>,
) -> impl Filter<Extract = (Arc<HealthCheckUseCase>,), Error = Infallible> + Clone {
    warp::any().map(move || health_use_case.clone())
}

pub fn with_monitoring(
    monitoring: Arc<MonitoringAdapter>,
) -> impl Filter<Extract = (Arc<MonitoringAdapter>,), Error = Infallible> + Clone {
    warp::any().map(move || monitoring.clone())
}

pub fn with_rate_limit_middleware(
    rate_limit_middleware: Arc<RateLimitMiddleware>,
) -> impl Filter<Extract = (Arc<RateLimitMiddleware>,), Error = Infallible> + Clone {
    warp::any().map(move || rate_limit_middleware.clone())
}

pub fn with_security_headers(
    security_headers: Arc<SecurityHeadersMiddleware>,
) -> impl Filter<Extract = (Arc<SecurityHeadersMiddleware>,), Error = Infallible> + Clone {
    warp::any().map(move || security_headers.clone())
}
