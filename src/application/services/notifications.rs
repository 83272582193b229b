//! Transactional email templates and dispatch

use std::sync::Arc;

use tracing::warn;

use crate::application::ports::{Mailer, OutgoingEmail};
use crate::config::app_config::FrontendConfig;
use crate::domain::Client;
use crate::shared::error::AppResult;

/// Builds the emails sent to clients and hands them to the mailer
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    frontend: FrontendConfig,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, frontend: FrontendConfig) -> Self {
        Self { mailer, frontend }
    }

    fn email(client: &Client, subject: &str, message: String) -> OutgoingEmail {
        OutgoingEmail {
            to_name: client.name.clone(),
            to_email: client.email.clone(),
            subject: subject.to_string(),
            message,
        }
    }

    pub fn confirmation_email(&self, client: &Client, token: &str) -> OutgoingEmail {
        Self::email(
            client,
            "Confirm your account",
            format!(
                "Hi {}, confirm your account by following this link: {}",
                client.name,
                self.frontend.confirm_link(token)
            ),
        )
    }

    pub fn password_reset_email(&self, client: &Client, token: &str) -> OutgoingEmail {
        Self::email(
            client,
            "Reset your password",
            format!(
                "Hi {}, follow this link to choose a new password: {}",
                client.name,
                self.frontend.reset_link(token)
            ),
        )
    }

    pub fn profile_updated_email(&self, client: &Client) -> OutgoingEmail {
        Self::email(
            client,
            "Personal details updated",
            format!(
                "Hi {}, your personal details were updated. You can sign in here: {}",
                client.name,
                self.frontend.login_link()
            ),
        )
    }

    pub async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        self.mailer.send(email).await
    }

    /// Send after a write has already been committed: a failure is logged
    /// and not returned
    pub async fn send_best_effort(&self, email: &OutgoingEmail) {
        if let Err(e) = self.mailer.send(email).await {
            warn!(
                to = %email.to_email,
                subject = %email.subject,
                error = %e,
                "Email dispatch failed after the change was saved"
            );
        }
    }
}
