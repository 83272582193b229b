//! Fakes and builders shared by the test suite

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::application::ports::{Mailer, OutgoingEmail, PaymentGateway};
use crate::application::services::{AppServices, ExerciseDraft, ServiceDependencies};
use crate::config::AppConfig;
use crate::domain::{GatewayPayment, MuscleGroup, NewClient, PreferenceRequest};
use crate::infrastructure::adapters::{LocalAvatarStorage, PasswordHasher, Store, TokenIssuerAdapter};
use crate::shared::error::{AppError, AppResult};

use super::config::{init, test_config};

/// Mailer that keeps every email and can be switched to fail
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Text of the most recent email to `address`
    pub fn last_message_to(&self, address: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|e| e.to_email == address)
            .map(|e| e.message.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::ExternalService("mail relay unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Payment gateway with scripted payment states
#[derive(Default)]
pub struct FakeGateway {
    payments: Mutex<HashMap<String, GatewayPayment>>,
    preferences: Mutex<Vec<PreferenceRequest>>,
    fetches: AtomicUsize,
    failing: AtomicBool,
}

impl FakeGateway {
    pub fn set_payment(&self, payment: GatewayPayment) {
        self.payments.lock().unwrap().insert(payment.id.clone(), payment);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn preferences(&self) -> Vec<PreferenceRequest> {
        self.preferences.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_preference(&self, request: &PreferenceRequest) -> AppResult<Value> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::ExternalService("gateway unavailable".to_string()));
        }
        self.preferences.lock().unwrap().push(request.clone());
        Ok(json!({
            "id": format!("pref-{}", request.external_reference),
            "init_point": "https://gateway.test/checkout",
            "external_reference": request.external_reference,
        }))
    }

    async fn fetch_payment(&self, gateway_payment_id: &str) -> AppResult<GatewayPayment> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::ExternalService("gateway unavailable".to_string()));
        }
        self.payments
            .lock()
            .unwrap()
            .get(gateway_payment_id)
            .cloned()
            .ok_or_else(|| AppError::ExternalService(format!("unknown payment {}", gateway_payment_id)))
    }
}

/// Approved gateway payment correlated by `external_reference`
pub fn approved_payment(id: &str, external_reference: &str, amount: f64) -> GatewayPayment {
    GatewayPayment {
        id: id.to_string(),
        status: "approved".to_string(),
        payment_method_id: Some("visa".to_string()),
        payment_type_id: Some("credit_card".to_string()),
        date_approved: Some(chrono::Utc::now()),
        date_last_updated: None,
        external_reference: Some(external_reference.to_string()),
        transaction_amount: Some(amount),
    }
}

/// Services over an in-memory store with recording fakes
pub struct TestContext {
    pub config: AppConfig,
    pub services: AppServices,
    pub deps: ServiceDependencies,
    pub mailer: Arc<RecordingMailer>,
    pub gateway: Arc<FakeGateway>,
    pub tokens: Arc<TokenIssuerAdapter>,
    pub uploads: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        init();
        let uploads = TempDir::new().unwrap();
        let config = test_config(uploads.path().to_str().unwrap());

        let mailer = Arc::new(RecordingMailer::default());
        let gateway = Arc::new(FakeGateway::default());
        let tokens = Arc::new(TokenIssuerAdapter::new(config.security.jwt.clone()));

        let deps = ServiceDependencies {
            store: Store::in_memory(),
            mailer: mailer.clone(),
            gateway: gateway.clone(),
            avatars: Arc::new(LocalAvatarStorage::new(&config.uploads).unwrap()),
            hasher: Arc::new(PasswordHasher::new(&config.security.password).unwrap()),
            tokens: tokens.clone(),
        };
        let services = AppServices::new(&config, deps.clone());

        Self {
            config,
            services,
            deps,
            mailer,
            gateway,
            tokens,
            uploads,
        }
    }

    pub fn store(&self) -> &Store {
        &self.services.store
    }

    /// Register a client with a fixed password and return its ID
    pub async fn register(&self, email: &str) -> String {
        self.services
            .clients
            .create_client(new_client(email, "s3cret-pass"))
            .await
            .unwrap()
    }

    /// A "Legs" muscle group holding a "Squat" exercise
    pub async fn legs_with_squat(&self) -> (MuscleGroup, String) {
        let legs = self
            .services
            .catalog
            .create_muscle_group("Legs", Some("Lower body"), &[])
            .await
            .unwrap();
        let squat = self
            .services
            .catalog
            .create_exercise(ExerciseDraft {
                name: "Squat".to_string(),
                description: "Barbell back squat".to_string(),
                execution: "Feet shoulder width, hips below knees".to_string(),
                muscle_group_id: legs.id.clone(),
            })
            .await
            .unwrap();
        let legs = self.services.catalog.get_muscle_group(&legs.id).await.unwrap();
        (legs, squat.id)
    }
}

pub fn new_client(email: &str, password: &str) -> NewClient {
    NewClient {
        name: "Ana".to_string(),
        surname: "García".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        national_id: None,
        age: Some(29),
        birth_date: None,
        weight: Some(61.5),
        height: Some(1.68),
        phone: None,
        nickname: None,
    }
}

/// Pull the token out of the last link emailed to `address`. Links end
/// with `/{token}`.
pub fn token_from_last_email(mailer: &RecordingMailer, address: &str) -> String {
    let message = mailer.last_message_to(address).expect("no email sent");
    let link = message.split_whitespace().last().expect("empty email");
    link.rsplit('/').next().unwrap().to_string()
}
