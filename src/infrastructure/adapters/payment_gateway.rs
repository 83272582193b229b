//! Mercado Pago payment gateway adapter

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::application::ports::PaymentGateway;
use crate::config::AppConfig;
use crate::domain::payments::{is_valid_gateway_payment_id, GatewayPayment, PreferenceRequest};
use crate::shared::error::{AppError, AppResult};

pub struct MercadoPagoGateway {
    api_url: String,
    access_token: String,
    back_urls: Value,
    notification_url: String,
    max_retries: u32,
    client: Client,
}

impl MercadoPagoGateway {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let payments = &config.payments;
        let client = Client::builder()
            .timeout(Duration::from_secs(payments.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_url: payments.api_url.trim_end_matches('/').to_string(),
            access_token: payments.access_token.clone(),
            back_urls: json!({
                "success": payments.success_url,
                "failure": payments.failure_url,
                "pending": payments.pending_url,
            }),
            notification_url: config.webhook_url(),
            max_retries: payments.max_retries,
            client,
        })
    }

    fn preference_body(&self, request: &PreferenceRequest) -> Value {
        json!({
            "items": request.items,
            "payer": request.payer,
            "back_urls": self.back_urls,
            "notification_url": self.notification_url,
            "auto_return": "approved",
            "external_reference": request.external_reference,
        })
    }

    /// Send a request, retrying transport errors and 5xx answers.
    ///
    /// `build` is called once per attempt because request builders are
    /// consumed by `send`.
    async fn send_with_retries<F>(&self, what: &str, build: F) -> AppResult<Value>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match build().bearer_auth(&self.access_token).send().await {
                Ok(response) if response.status().is_success() => {
                    return response.json::<Value>().await.map_err(|e| {
                        AppError::ExternalService(format!("{}: unreadable response: {}", what, e))
                    });
                }
                Ok(response) if response.status().is_client_error() => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalService(format!(
                        "{}: gateway answered {}: {}",
                        what, status, body
                    )));
                }
                Ok(response) => {
                    last_error = Some(format!("HTTP error: {}", response.status()));
                }
                Err(e) => {
                    last_error = Some(format!("Request failed: {}", e));
                }
            }

            if attempt < self.max_retries {
                warn!(
                    operation = %what,
                    attempt = attempt + 1,
                    max_attempts = self.max_retries + 1,
                    "Gateway request failed, retrying"
                );
                tokio::time::sleep(Duration::from_millis(200 * (attempt + 1) as u64)).await;
            }
        }

        Err(AppError::ExternalService(format!(
            "{} failed after {} attempts: {}",
            what,
            self.max_retries + 1,
            last_error.unwrap_or_default()
        )))
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    async fn create_preference(&self, request: &PreferenceRequest) -> AppResult<Value> {
        let url = format!("{}/checkout/preferences", self.api_url);
        let body = self.preference_body(request);

        // The idempotency key makes retried creations collapse into one
        let preference = self
            .send_with_retries("create preference", || {
                self.client
                    .post(&url)
                    .header("X-Idempotency-Key", &request.external_reference)
                    .json(&body)
            })
            .await?;

        info!(
            external_reference = %request.external_reference,
            preference_id = preference.get("id").and_then(serde_json::Value::as_str).unwrap_or("unknown"),
            "Checkout preference created"
        );
        Ok(preference)
    }

    async fn fetch_payment(&self, gateway_payment_id: &str) -> AppResult<GatewayPayment> {
        if !is_valid_gateway_payment_id(gateway_payment_id) {
            return Err(AppError::Validation(format!(
                "malformed gateway payment ID: {:?}",
                gateway_payment_id
            )));
        }
        let url = format!("{}/v1/payments/{}", self.api_url, gateway_payment_id);
        let value = self
            .send_with_retries("fetch payment", || self.client.get(&url))
            .await?;
        parse_payment(&value, gateway_payment_id)
    }
}

fn text_or_number(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Read the fields we rely on from a gateway payment resource
pub fn parse_payment(value: &Value, requested_id: &str) -> AppResult<GatewayPayment> {
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::ExternalService("gateway payment has no status".to_string()))?;

    Ok(GatewayPayment {
        id: text_or_number(value.get("id")).unwrap_or_else(|| requested_id.to_string()),
        status: status.to_string(),
        payment_method_id: text_or_number(value.get("payment_method_id")),
        payment_type_id: text_or_number(value.get("payment_type_id")),
        date_approved: timestamp(value.get("date_approved")),
        date_last_updated: timestamp(value.get("date_last_updated")),
        external_reference: text_or_number(value.get("external_reference")),
        transaction_amount: value.get("transaction_amount").and_then(Value::as_f64),
    })
}
