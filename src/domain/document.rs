//! Persisted document abstraction

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// An entity stored as one JSON document in a named collection
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, also used as the key namespace in the store
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Mint a new document ID.
///
/// UUIDv7 strings sort lexicographically in creation order, which gives
/// listings a stable order.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}
