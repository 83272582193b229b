//! HTTP route handlers, one module per endpoint family

pub mod graphql;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod uploads;
pub mod webhook;

pub use graphql::{handle_graphiql, handle_graphql_request, GraphqlState};
pub use health::handle_health_request;
pub use metrics::handle_prometheus_request;
pub use payments::{handle_process_payment, ProcessPaymentRequest};
pub use uploads::handle_upload_request;
pub use webhook::handle_payment_webhook;
