//! Use cases - Application operations spanning several services

pub mod health_check;

pub use health_check::HealthCheckUseCase;
