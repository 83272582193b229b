//! Seams to the collaborators the services depend on
//!
//! Each trait has a production adapter under `infrastructure::adapters` and
//! a fake in the test fixtures.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::payments::{GatewayPayment, PreferenceRequest};
use crate::shared::error::AppResult;

/// Raw document storage keyed by collection and ID.
///
/// Documents are opaque bytes at this level; typing happens in
/// `Collection<T>`.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn fetch(&self, collection: &str, id: &str) -> AppResult<Option<Vec<u8>>>;

    async fn fetch_all(&self, collection: &str) -> AppResult<Vec<(String, Vec<u8>)>>;

    /// Atomic compare-and-swap. Writes `document` only when the stored value
    /// equals `expected` (`None` meaning absent) and reports whether it did.
    async fn swap(
        &self,
        collection: &str,
        id: &str,
        expected: Option<&[u8]>,
        document: Vec<u8>,
    ) -> AppResult<bool>;

    /// Returns whether a document was removed
    async fn remove(&self, collection: &str, id: &str) -> AppResult<bool>;

    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> AppResult<()>;
}

/// A transactional email
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to_name: String,
    pub to_email: String,
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()>;
}

/// Third-party payment processor
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout preference and return the gateway's payload verbatim
    async fn create_preference(&self, request: &PreferenceRequest) -> AppResult<Value>;

    /// Fetch the authoritative state of a gateway payment
    async fn fetch_payment(&self, gateway_payment_id: &str) -> AppResult<GatewayPayment>;
}

/// An uploaded avatar image
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait AvatarStorage: Send + Sync {
    /// Persist the file and return its public path
    async fn save(&self, client_id: &str, upload: &AvatarUpload) -> AppResult<String>;
}
