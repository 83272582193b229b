//! Health, metrics and uploaded file routes

use std::path::PathBuf;
use std::sync::Arc;

use warp::Filter;

use crate::application::services::AppServices;
use crate::application::use_cases::HealthCheckUseCase;
use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::handlers::{handle_health_request, handle_prometheus_request, handle_upload_request};
use crate::infrastructure::http::utils::{with_health_use_case, with_monitoring, with_security_headers, with_services};
use crate::middleware::SecurityHeadersMiddleware;

pub struct MonitoringRoutes;

impl MonitoringRoutes {
    /// `GET /health`
    pub fn create_health_route(
        health_use_case: Arc<HealthCheckUseCase>,
        services: AppServices,
        monitoring: Arc<MonitoringAdapter>,
        security_headers: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_health_use_case(health_use_case))
            .and(with_services(services))
            .and(with_monitoring(monitoring))
            .and(with_security_headers(security_headers))
            .and_then(handle_health_request)
    }

    /// `GET /metrics` in Prometheus text format
    pub fn create_prometheus_route(
        monitoring: Arc<MonitoringAdapter>,
        security_headers: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_monitoring(monitoring))
            .and(with_security_headers(security_headers))
            .and_then(handle_prometheus_request)
    }

    /// `GET /uploads/{path}` from the uploads root directory
    pub fn create_uploads_route(
        root_dir: &str,
        security_headers: Arc<SecurityHeadersMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let root = Arc::new(PathBuf::from(root_dir));
        warp::path("uploads")
            .and(warp::get())
            .and(warp::path::tail())
            .and(warp::any().map(move || root.clone()))
            .and(with_security_headers(security_headers))
            .and_then(handle_upload_request)
    }
}
