//! Application services - Orchestration of domain logic

pub mod catalog_service;
pub mod client_service;
pub mod notifications;
pub mod payments_service;
pub mod routine_service;
pub mod session_service;

use std::sync::Arc;

use tracing::info;

use crate::application::ports::{AvatarStorage, Mailer, PaymentGateway};
use crate::config::AppConfig;
use crate::infrastructure::adapters::{
    EmailJsMailer, LocalAvatarStorage, LogMailer, MercadoPagoGateway, PasswordHasher, Store, TokenIssuerAdapter,
};
use crate::shared::error::AppResult;

pub use catalog_service::{CatalogService, ExerciseDraft};
pub use client_service::ClientService;
pub use notifications::Notifier;
pub use payments_service::PaymentsService;
pub use routine_service::RoutineService;
pub use session_service::{ActionResult, Login, SessionService, SessionState};

/// Collaborators the services are built from. Production code builds them
/// from configuration; tests inject in-memory storage and fakes.
#[derive(Clone)]
pub struct ServiceDependencies {
    pub store: Store,
    pub mailer: Arc<dyn Mailer>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub avatars: Arc<dyn AvatarStorage>,
    pub hasher: Arc<PasswordHasher>,
    pub tokens: Arc<TokenIssuerAdapter>,
}

impl ServiceDependencies {
    /// Connect the adapters selected by configuration
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let store = Store::connect(&config.store).await?;
        info!(backend = ?config.store.backend, "Document store ready");

        let mailer: Arc<dyn Mailer> = if config.mail.enabled {
            Arc::new(EmailJsMailer::new(config.mail.clone())?)
        } else {
            info!("Mail delivery disabled, emails will only be logged");
            Arc::new(LogMailer)
        };

        Ok(Self {
            store,
            mailer,
            gateway: Arc::new(MercadoPagoGateway::new(config)?),
            avatars: Arc::new(LocalAvatarStorage::new(&config.uploads)?),
            hasher: Arc::new(PasswordHasher::new(&config.security.password)?),
            tokens: Arc::new(TokenIssuerAdapter::new(config.security.jwt.clone())),
        })
    }
}

/// Handles to every service, shared by the HTTP layer
#[derive(Clone)]
pub struct AppServices {
    pub store: Store,
    pub catalog: Arc<CatalogService>,
    pub routines: Arc<RoutineService>,
    pub clients: Arc<ClientService>,
    pub sessions: Arc<SessionService>,
    pub payments: Arc<PaymentsService>,
}

impl AppServices {
    pub fn new(config: &AppConfig, deps: ServiceDependencies) -> Self {
        let notifier = Arc::new(Notifier::new(deps.mailer, config.frontend.clone()));

        Self {
            catalog: Arc::new(CatalogService::new(deps.store.clone())),
            routines: Arc::new(RoutineService::new(deps.store.clone())),
            clients: Arc::new(ClientService::new(
                deps.store.clone(),
                deps.hasher.clone(),
                deps.tokens.clone(),
                notifier.clone(),
                deps.avatars,
                config.uploads.max_file_size,
            )),
            sessions: Arc::new(SessionService::new(
                deps.store.clone(),
                deps.hasher,
                deps.tokens,
                notifier,
            )),
            payments: Arc::new(PaymentsService::new(deps.store.clone(), deps.gateway, config.payments.enabled)),
            store: deps.store,
        }
    }
}
