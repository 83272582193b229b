//! Security headers for JSON responses

use serde::Serialize;
use warp::http::header::{HeaderName, HeaderValue};
use warp::Reply;

use crate::config::AppConfig;

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
    ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
    ("cache-control", "no-store"),
];

/// Adds a fixed set of hardening headers when enabled in configuration
#[derive(Debug, Clone)]
pub struct SecurityHeadersMiddleware {
    enabled: bool,
}

impl SecurityHeadersMiddleware {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            enabled: config.security.enable_security_headers,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn apply(&self, response: &mut warp::reply::Response) {
        if !self.enabled {
            return;
        }
        let headers = response.headers_mut();
        for (name, value) in SECURITY_HEADERS {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
    }
}

/// Convert any reply and add the security headers
pub fn add_security_headers_to_response(reply: impl Reply, middleware: &SecurityHeadersMiddleware) -> warp::reply::Response {
    let mut response = reply.into_response();
    middleware.apply(&mut response);
    response
}

/// Serialize `value` as JSON and add the security headers
pub fn create_json_response_with_security_headers<T: Serialize>(
    value: &T,
    middleware: &SecurityHeadersMiddleware,
) -> warp::reply::Response {
    add_security_headers_to_response(warp::reply::json(value), middleware)
}
