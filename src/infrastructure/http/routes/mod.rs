//! HTTP route configurations

pub mod builder;
pub mod graphql;
pub mod monitoring;
pub mod payments;

pub use builder::{RouteBuilder, RouteDependencies};
pub use graphql::GraphqlRoutes;
pub use monitoring::MonitoringRoutes;
pub use payments::PaymentsRoutes;
