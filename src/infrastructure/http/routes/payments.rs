//! Payment routes: checkout creation and the gateway webhook

use std::collections::HashMap;
use std::sync::Arc;

use warp::Filter;

use crate::application::services::AppServices;
use crate::config::AppConfig;
use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::handlers::{handle_payment_webhook, handle_process_payment};
use crate::infrastructure::http::utils::{
    with_client_ip, with_monitoring, with_rate_limit_middleware, with_security_headers, with_services,
};
use crate::middleware::{RateLimitMiddleware, SecurityHeadersMiddleware};

/// Largest webhook body accepted; notifications are small
const WEBHOOK_BODY_LIMIT: u64 = 64 * 1024;

pub struct PaymentsRoutes;

impl PaymentsRoutes {
    /// `POST /process_payment`
    pub fn create_process_payment_route(
        config: AppConfig,
        services: AppServices,
        rate_limit: Arc<RateLimitMiddleware>,
        security_headers: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("process_payment")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(config.server.max_request_size))
            .and(warp::body::json())
            .and(with_client_ip(config))
            .and(with_services(services))
            .and(with_rate_limit_middleware(rate_limit))
            .and(with_security_headers(security_headers))
            .and_then(handle_process_payment)
    }

    /// `POST /webhook`
    pub fn create_webhook_route(
        services: AppServices,
        monitoring: Arc<MonitoringAdapter>,
        security_headers: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("webhook")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::body::content_length_limit(WEBHOOK_BODY_LIMIT))
            .and(warp::body::bytes())
            .and(with_services(services))
            .and(with_monitoring(monitoring))
            .and(with_security_headers(security_headers))
            .and_then(handle_payment_webhook)
    }
}
