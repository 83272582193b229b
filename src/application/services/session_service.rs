//! Login sessions, account confirmation and password reset

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::services::notifications::Notifier;
use crate::domain::rules::normalize_email;
use crate::domain::Client;
use crate::infrastructure::adapters::{PasswordHasher, Store, TokenIssuerAdapter, TokenPurpose};
use crate::shared::error::{AppError, AppResult};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// A successful login
#[derive(Debug, Clone)]
pub struct Login {
    pub token: String,
    pub client: Client,
}

/// Outcome of verifying the session cookie
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub authenticated: bool,
    pub client: Option<Client>,
}

/// Structured result of token-bound operations
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

pub struct SessionService {
    store: Store,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenIssuerAdapter>,
    notifier: Arc<Notifier>,
}

impl SessionService {
    pub fn new(
        store: Store,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenIssuerAdapter>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            notifier,
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Client>> {
        self.store.clients.find_one(|c| c.email == email).await
    }

    async fn require_by_email(&self, email: &str) -> AppResult<Client> {
        let email = normalize_email(email)?;
        self.find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no client is registered with {}", email)))
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown email and wrong password fail identically, and both run one
    /// password verification.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Login> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation("email and password are required".to_string()));
        }

        let email = email.trim().to_lowercase();
        let client = self.find_by_email(&email).await?;
        let stored_hash = client.as_ref().map(|c| c.password_hash.clone());

        let verified = self
            .hasher
            .clone()
            .verify_blocking(password.to_string(), stored_hash)
            .await?;

        match client {
            Some(client) if verified => {
                let token = self.tokens.issue_session(&client.id, &client.email)?;
                info!(client_id = %client.id, "Client logged in");
                Ok(Login { token, client })
            }
            _ => Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string())),
        }
    }

    /// Resolve the session cookie. Every failure is an unauthenticated state.
    pub async fn verify_session(&self, token: Option<&str>) -> SessionState {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return SessionState::default();
        };

        let claims = match self.tokens.verify_session(token) {
            Ok(claims) => claims,
            Err(_) => return SessionState::default(),
        };

        match self.store.clients.get(&claims.sub).await {
            Ok(Some(client)) => SessionState {
                authenticated: true,
                client: Some(client),
            },
            Ok(None) => SessionState::default(),
            Err(e) => {
                warn!(error = %e, "Session lookup failed");
                SessionState::default()
            }
        }
    }

    pub async fn confirm_account(&self, token: &str) -> AppResult<ActionResult> {
        let client_id = match self.tokens.verify_confirmation(token, TokenPurpose::Confirmation) {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "Confirmation rejected");
                return Ok(ActionResult::failed("the confirmation link is invalid or has expired"));
            }
        };

        if self.store.clients.get(&client_id).await?.is_none() {
            return Ok(ActionResult::failed("the confirmation link is invalid or has expired"));
        }

        let (_, changed) = self
            .store
            .clients
            .modify(&client_id, "client", |client| {
                client.confirmed = true;
                Ok(())
            })
            .await?;

        if changed {
            info!(client_id = %client_id, "Account confirmed");
            Ok(ActionResult::ok("account confirmed"))
        } else {
            Ok(ActionResult::failed("the account is already confirmed"))
        }
    }

    /// Email a reset link. The account is only marked unconfirmed once the
    /// email went out.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<ActionResult> {
        let client = self.require_by_email(email).await?;
        let token = self.tokens.issue_confirmation(&client.id, TokenPurpose::PasswordReset)?;

        let message = self.notifier.password_reset_email(&client, &token);
        self.notifier.send(&message).await?;

        self.store
            .clients
            .update(&client.id, "client", |client| {
                client.confirmed = false;
                Ok(())
            })
            .await?;

        info!(client_id = %client.id, "Password reset requested");
        Ok(ActionResult::ok("a password reset link was sent"))
    }

    pub async fn complete_password_reset(&self, token: &str, new_password: &str) -> AppResult<ActionResult> {
        if new_password.trim().is_empty() {
            return Err(AppError::Validation("password is required".to_string()));
        }

        let client_id = match self.tokens.verify_confirmation(token, TokenPurpose::PasswordReset) {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "Password reset rejected");
                return Ok(ActionResult::failed("the reset link is invalid or has expired"));
            }
        };

        if self.store.clients.get(&client_id).await?.is_none() {
            return Ok(ActionResult::failed("the reset link is invalid or has expired"));
        }

        let password_hash = self.hasher.clone().hash_blocking(new_password.to_string()).await?;
        self.store
            .clients
            .update(&client_id, "client", |client| {
                client.password_hash = password_hash.clone();
                client.confirmed = true;
                Ok(())
            })
            .await?;

        info!(client_id = %client_id, "Password reset completed");
        Ok(ActionResult::ok("password updated"))
    }

    pub async fn resend_confirmation(&self, email: &str) -> AppResult<ActionResult> {
        let client = self.require_by_email(email).await?;
        if client.confirmed {
            return Err(AppError::Conflict("the account is already confirmed".to_string()));
        }

        let token = self.tokens.issue_confirmation(&client.id, TokenPurpose::Confirmation)?;
        let message = self.notifier.confirmation_email(&client, &token);
        self.notifier.send(&message).await?;

        Ok(ActionResult::ok("a new confirmation link was sent"))
    }
}
