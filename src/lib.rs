//! FitNet server - GraphQL backend for gym management
//!
//! Clients, training routines, the exercise catalog grouped by muscle group
//! and membership payments, exposed over GraphQL with a payment gateway
//! webhook on the side.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod middleware;
pub mod shared;

#[cfg(test)]
mod tests;

pub use config::AppConfig;
pub use infrastructure::http::HttpServer;
pub use shared::error::{AppError, AppResult};

/// Application result type
pub type Result<T> = std::result::Result<T, shared::error::AppError>;
