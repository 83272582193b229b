//! HTTP middleware: CORS, security headers and rate limiting

pub mod cors;
pub mod rate_limit;
pub mod security_headers;

pub use cors::CorsMiddleware;
pub use rate_limit::RateLimitMiddleware;
pub use security_headers::{
    add_security_headers_to_response, create_json_response_with_security_headers, SecurityHeadersMiddleware,
};
