//! Infrastructure layer - Storage, external services and HTTP

pub mod adapters;
pub mod http;

pub use adapters::{MonitoringAdapter, Store};
