//! Health check handler

use std::sync::Arc;

use warp::http::StatusCode;

use crate::application::services::AppServices;
use crate::application::use_cases::HealthCheckUseCase;
use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::responses::ResponseFormatter;
use crate::middleware::SecurityHeadersMiddleware;

/// Liveness with document store reachability. Answers 503 when the store is down.
pub async fn handle_health_request(
    health_use_case: Arc<HealthCheckUseCase>,
    services: AppServices,
    monitoring: Arc<MonitoringAdapter>,
    security_headers: Arc<SecurityHeadersMiddleware>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let response = match health_use_case.execute(&services.store, Some(&monitoring)).await {
        Ok(health) => {
            let status = StatusCode::from_u16(health.http_status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
            ResponseFormatter::json(&health, status, &security_headers)
        }
        Err(e) => ResponseFormatter::from_app_error(&e, &security_headers),
    };
    Ok(response)
}
