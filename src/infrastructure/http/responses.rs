//! HTTP response formatting and rejection recovery

use std::convert::Infallible;

use serde::Serialize;
use tracing::error;
use warp::http::StatusCode;
use warp::Reply;

use crate::middleware::security_headers::{create_json_response_with_security_headers, SecurityHeadersMiddleware};
use crate::shared::error::AppError;

/// Response formatter for the JSON endpoints
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// JSON body with an explicit status and the security headers
    pub fn json<T: Serialize>(
        value: &T,
        status: StatusCode,
        security_headers: &SecurityHeadersMiddleware,
    ) -> warp::reply::Response {
        warp::reply::with_status(create_json_response_with_security_headers(value, security_headers), status)
            .into_response()
    }

    /// Error body `{"error": {"code", "message"}}` with the error's status
    pub fn from_app_error(error: &AppError, security_headers: &SecurityHeadersMiddleware) -> warp::reply::Response {
        Self::json(&error.to_json(), error.http_status_code(), security_headers)
    }
}

fn status_body(code: &str, message: &str, status: StatusCode) -> warp::reply::Response {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": { "code": code, "message": message } })),
        status,
    )
    .into_response()
}

/// Turn warp rejections into JSON error bodies
pub async fn handle_rejection(rejection: warp::Rejection) -> Result<warp::reply::Response, Infallible> {
    if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(status_body("PAYLOAD_TOO_LARGE", "request body is too large", StatusCode::PAYLOAD_TOO_LARGE));
    }
    if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(status_body("METHOD_NOT_ALLOWED", "method not allowed", StatusCode::METHOD_NOT_ALLOWED));
    }

    let error = if rejection.is_not_found() {
        AppError::NotFound("route not found".to_string())
    } else if let Some(e) = rejection.find::<AppError>() {
        e.clone()
    } else if let Some(e) = rejection.find::<warp::body::BodyDeserializeError>() {
        AppError::Json(e.to_string())
    } else {
        error!(rejection = ?rejection, "Unhandled rejection");
        AppError::Internal(format!("{:?}", rejection))
    };

    Ok(warp::reply::with_status(warp::reply::json(&error.to_json()), error.http_status_code()).into_response())
}
