//! In-memory document backend

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::DocumentBackend;
use crate::shared::error::AppResult;

type Collections = HashMap<String, HashMap<String, Vec<u8>>>;

/// Process-local backend used for development and tests
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentBackend for MemoryDocumentStore {
    async fn fetch(&self, collection: &str, id: &str) -> AppResult<Option<Vec<u8>>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn fetch_all(&self, collection: &str) -> AppResult<Vec<(String, Vec<u8>)>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, doc)| (id.clone(), doc.clone())).collect())
            .unwrap_or_default())
    }

    async fn swap(
        &self,
        collection: &str,
        id: &str,
        expected: Option<&[u8]>,
        document: Vec<u8>,
    ) -> AppResult<bool> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.get(id).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        docs.insert(id.to_string(), document);
        Ok(true)
    }

    async fn remove(&self, collection: &str, id: &str) -> AppResult<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
