//! Typed collections over a `DocumentBackend`

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::application::ports::DocumentBackend;
use crate::config::app_config::{StoreBackend, StoreConfig};
use crate::domain::{Client, Document, Exercise, MuscleGroup, Payment, Routine};
use crate::shared::error::{AppError, AppResult};

use super::memory_store::MemoryDocumentStore;
use super::redis_store::RedisDocumentStore;

/// Compare-and-swap attempts before a concurrent update gives up
const MAX_SWAP_ATTEMPTS: usize = 5;

/// JSON documents of one entity type
pub struct Collection<T: Document> {
    backend: Arc<dyn DocumentBackend>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Collection<T> {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            _marker: PhantomData,
        }
    }

    fn encode(document: &T) -> AppResult<Vec<u8>> {
        serde_json::to_vec(document)
            .map_err(|e| AppError::Internal(format!("serialize {}: {}", T::COLLECTION, e)))
    }

    fn decode(bytes: &[u8]) -> AppResult<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| AppError::Store(format!("corrupt {} document: {}", T::COLLECTION, e)))
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<T>> {
        match self.backend.fetch(T::COLLECTION, id).await? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like `get`, but a missing document is a `NotFound` naming `what`
    pub async fn require(&self, id: &str, what: &str) -> AppResult<T> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} does not exist", what, id)))
    }

    /// All documents in creation order
    pub async fn list(&self) -> AppResult<Vec<T>> {
        let mut entries = self.backend.fetch_all(T::COLLECTION).await?;
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.iter().map(|(_, bytes)| Self::decode(bytes)).collect()
    }

    pub async fn find_one<P>(&self, predicate: P) -> AppResult<Option<T>>
    where
        P: Fn(&T) -> bool,
    {
        Ok(self.list().await?.into_iter().find(|doc| predicate(doc)))
    }

    /// Insert a new document; an existing ID is a `Conflict`
    pub async fn insert(&self, document: &T) -> AppResult<()> {
        let bytes = Self::encode(document)?;
        if self.backend.swap(T::COLLECTION, document.id(), None, bytes).await? {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "{} {} already exists",
                T::COLLECTION,
                document.id()
            )))
        }
    }

    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        self.backend.remove(T::COLLECTION, id).await
    }

    /// Read-modify-write a document under optimistic concurrency.
    ///
    /// `mutate` runs on every attempt against the freshly read document, so
    /// guards inside it always see the latest state. When the mutation
    /// leaves the document byte-identical nothing is written. Returns the
    /// resulting document and whether it was written.
    pub async fn modify<F>(&self, id: &str, what: &str, mut mutate: F) -> AppResult<(T, bool)>
    where
        F: FnMut(&mut T) -> AppResult<()> + Send,
    {
        for attempt in 1..=MAX_SWAP_ATTEMPTS {
            let current = self
                .backend
                .fetch(T::COLLECTION, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("{} {} does not exist", what, id)))?;

            let mut document = Self::decode(&current)?;
            mutate(&mut document)?;
            let next = Self::encode(&document)?;

            if next == current {
                return Ok((document, false));
            }

            if self.backend.swap(T::COLLECTION, id, Some(&current), next).await? {
                return Ok((document, true));
            }

            debug!(
                collection = T::COLLECTION,
                id = %id,
                attempt = attempt,
                "Concurrent write detected, retrying update"
            );
        }

        Err(AppError::Conflict(format!(
            "{} {} is being modified concurrently, try again",
            what, id
        )))
    }

    /// `modify` without the changed flag
    pub async fn update<F>(&self, id: &str, what: &str, mutate: F) -> AppResult<T>
    where
        F: FnMut(&mut T) -> AppResult<()> + Send,
    {
        self.modify(id, what, mutate).await.map(|(document, _)| document)
    }
}

/// Every collection of the application over one backend
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn DocumentBackend>,
    pub clients: Collection<Client>,
    pub routines: Collection<Routine>,
    pub exercises: Collection<Exercise>,
    pub muscle_groups: Collection<MuscleGroup>,
    pub payments: Collection<Payment>,
}

impl Store {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            clients: Collection::new(backend.clone()),
            routines: Collection::new(backend.clone()),
            exercises: Collection::new(backend.clone()),
            muscle_groups: Collection::new(backend.clone()),
            payments: Collection::new(backend.clone()),
            backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryDocumentStore::new()))
    }

    /// Build the store selected by configuration
    pub async fn connect(config: &StoreConfig) -> AppResult<Self> {
        match config.backend {
            StoreBackend::Memory => Ok(Self::in_memory()),
            StoreBackend::Redis => {
                let url = config.redis_url.as_deref().ok_or_else(|| {
                    AppError::Config("store.redis_url is required for the redis backend".to_string())
                })?;
                let backend = RedisDocumentStore::connect(url, &config.key_prefix).await?;
                Ok(Self::new(Arc::new(backend)))
            }
        }
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.backend.ping().await
    }
}
