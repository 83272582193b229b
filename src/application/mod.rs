//! Application layer - Use cases and application services
//!
//! Services enforce the catalog, routine, client, session and payment
//! rules on top of the storage and integration ports.

pub mod ports;
pub mod services;
pub mod use_cases;

pub use services::{AppServices, ServiceDependencies};
pub use use_cases::HealthCheckUseCase;
