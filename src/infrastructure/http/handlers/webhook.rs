//! Payment gateway webhook
//!
//! The gateway retries anything that is not a 2xx, so every failure that a
//! retry cannot fix is acknowledged with 200. Only a document store failure
//! answers 500.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{debug, error, warn};
use warp::http::StatusCode;

use crate::application::services::AppServices;
use crate::domain::is_valid_gateway_payment_id;
use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::responses::ResponseFormatter;
use crate::middleware::SecurityHeadersMiddleware;

const PAYMENT_TOPIC: &str = "payment";

/// Pull the gateway payment ID out of a notification.
///
/// Looks at `data.id` in the body, then `resource` (a URL whose last path
/// segment is the ID, or the bare ID), then the `data.id` and `id` query
/// parameters. IDs that are not plain gateway tokens are dropped.
pub fn extract_payment_id(body: &Value, query: &HashMap<String, String>) -> Option<String> {
    let from_body = body
        .get("data")
        .and_then(|data| data.get("id"))
        .and_then(id_value)
        .or_else(|| {
            body.get("resource").and_then(|resource| match resource {
                Value::String(s) => s
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                other => id_value(other),
            })
        });

    from_body
        .or_else(|| {
            query
                .get("data.id")
                .or_else(|| query.get("id"))
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .filter(|id| is_valid_gateway_payment_id(id))
}

fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Notifications about anything other than payments are acknowledged and dropped
fn is_payment_topic(body: &Value, query: &HashMap<String, String>) -> bool {
    let topic = query
        .get("type")
        .or_else(|| query.get("topic"))
        .map(String::as_str)
        .or_else(|| body.get("type").and_then(Value::as_str));
    topic.is_none_or(|t| t == PAYMENT_TOPIC)
}

pub async fn handle_payment_webhook(
    query: HashMap<String, String>,
    body: Bytes,
    services: AppServices,
    monitoring: Arc<MonitoringAdapter>,
    security_headers: Arc<SecurityHeadersMiddleware>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let payload: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            warn!(error = %e, "Webhook body is not JSON");
            Value::Null
        })
    };

    let acknowledge = |outcome: &str| {
        monitoring.record_webhook(outcome);
        ResponseFormatter::json(
            &json!({ "status": "received", "outcome": outcome }),
            StatusCode::OK,
            &security_headers,
        )
    };

    if !is_payment_topic(&payload, &query) {
        debug!(query = ?query, "Ignoring non-payment notification");
        return Ok(acknowledge("ignored"));
    }

    let Some(payment_id) = extract_payment_id(&payload, &query) else {
        warn!("Webhook notification without a usable payment ID");
        return Ok(acknowledge("ignored"));
    };

    match services.payments.process_notification(&payment_id).await {
        Ok(outcome) => Ok(acknowledge(outcome.label())),
        Err(e) if e.is_storage_failure() => {
            error!(gateway_payment_id = %payment_id, error = %e, "Webhook processing hit a storage failure");
            monitoring.record_webhook("failed");
            Ok(ResponseFormatter::from_app_error(&e, &security_headers))
        }
        Err(e) => {
            error!(gateway_payment_id = %payment_id, error = %e, "Webhook processing failed");
            Ok(acknowledge("failed"))
        }
    }
}
