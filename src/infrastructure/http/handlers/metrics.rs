//! Prometheus exposition handler

use std::sync::Arc;

use warp::http::StatusCode;

use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::responses::ResponseFormatter;
use crate::middleware::security_headers::{add_security_headers_to_response, SecurityHeadersMiddleware};

pub async fn handle_prometheus_request(
    monitoring: Arc<MonitoringAdapter>,
    security_headers: Arc<SecurityHeadersMiddleware>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let response = match monitoring.get_prometheus_metrics() {
        Ok(metrics) => add_security_headers_to_response(
            warp::reply::with_header(
                warp::reply::with_status(metrics, StatusCode::OK),
                "Content-Type",
                "text/plain; version=0.0.4; charset=utf-8",
            ),
            &security_headers,
        ),
        Err(e) => ResponseFormatter::from_app_error(&e, &security_headers),
    };
    Ok(response)
}
