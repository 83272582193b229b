//! Payments HTTP handlers

use std::sync::Arc;

use serde::Deserialize;
use warp::http::StatusCode;

use crate::application::services::AppServices;
use crate::domain::{CheckoutItem, CheckoutPayer};
use crate::infrastructure::http::responses::ResponseFormatter;
use crate::middleware::{RateLimitMiddleware, SecurityHeadersMiddleware};
use crate::shared::logging::LoggingUtils;

/// Body of `POST /process_payment`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub client_id: String,
    pub items: Vec<CheckoutItem>,
    #[serde(default)]
    pub payer: CheckoutPayer,
}

/// Start a gateway checkout and return the preference payload
pub async fn handle_process_payment(
    body: ProcessPaymentRequest,
    client_ip: String,
    services: AppServices,
    rate_limit: Arc<RateLimitMiddleware>,
    security_headers: Arc<SecurityHeadersMiddleware>,
) -> Result<warp::reply::Response, warp::Rejection> {
    if let Err(e) = rate_limit.check(&client_ip) {
        LoggingUtils::log_rate_limit(&client_ip, "process_payment");
        return Ok(ResponseFormatter::from_app_error(&e, &security_headers));
    }

    let response = match services
        .payments
        .create_checkout(&body.client_id, body.items, body.payer)
        .await
    {
        Ok(preference) => ResponseFormatter::json(&preference, StatusCode::OK, &security_headers),
        Err(e) => ResponseFormatter::from_app_error(&e, &security_headers),
    };
    Ok(response)
}
