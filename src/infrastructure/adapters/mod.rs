//! Infrastructure adapters module
//!
//! This module contains adapters for external services and infrastructure concerns.

pub mod avatar_storage;
pub mod collection;
pub mod mailer;
pub mod memory_store;
pub mod monitoring;
pub mod password_hasher;
pub mod payment_gateway;
pub mod redis_store;
pub mod token_issuer;

pub use avatar_storage::LocalAvatarStorage;
pub use collection::{Collection, Store};
pub use mailer::{EmailJsMailer, LogMailer};
pub use memory_store::MemoryDocumentStore;
pub use monitoring::MonitoringAdapter;
pub use password_hasher::PasswordHasher;
pub use payment_gateway::MercadoPagoGateway;
pub use redis_store::RedisDocumentStore;
pub use token_issuer::{ConfirmationClaims, SessionClaims, TokenIssuerAdapter, TokenPurpose};
