//! Outgoing email adapters

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::application::ports::{Mailer, OutgoingEmail};
use crate::config::app_config::MailConfig;
use crate::shared::error::{AppError, AppResult};

/// Sends mail through the EmailJS REST API
pub struct EmailJsMailer {
    config: MailConfig,
    client: Client,
}

impl EmailJsMailer {
    pub fn new(config: MailConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn payload(&self, email: &OutgoingEmail) -> Value {
        json!({
            "service_id": self.config.service_id,
            "template_id": self.config.template_id,
            "user_id": self.config.public_key,
            "accessToken": self.config.private_key,
            "template_params": {
                "name": email.to_name,
                "email": email.to_email,
                "subject": email.subject,
                "message": email.message,
            }
        })
    }
}

#[async_trait]
impl Mailer for EmailJsMailer {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        let response = self
            .client
            .post(&self.config.api_url)
            .json(&self.payload(email))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Email request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Email service answered {}: {}",
                status, body
            )));
        }

        info!(to = %email.to_email, subject = %email.subject, "Email dispatched");
        Ok(())
    }
}

/// Logs emails instead of sending them; used when mail is disabled
#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        info!(
            to = %email.to_email,
            subject = %email.subject,
            message = %email.message,
            "Mail disabled, email not sent"
        );
        Ok(())
    }
}
