//! Route builder module
//!
//! Assembles every endpoint into a single filter.

use std::sync::Arc;

use warp::Filter;

use crate::application::services::AppServices;
use crate::application::use_cases::HealthCheckUseCase;
use crate::config::AppConfig;
use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::cookies::SessionCookie;
use crate::infrastructure::http::graphql::build_schema;
use crate::infrastructure::http::handlers::GraphqlState;
use crate::infrastructure::http::routes::{GraphqlRoutes, MonitoringRoutes, PaymentsRoutes};
use crate::middleware::{RateLimitMiddleware, SecurityHeadersMiddleware};

/// Shared handles the routes are built from
#[derive(Clone)]
pub struct RouteDependencies {
    pub config: AppConfig,
    pub services: AppServices,
    pub monitoring: Arc<MonitoringAdapter>,
    pub health_use_case: Arc<HealthCheckUseCase>,
    pub rate_limit: Arc<RateLimitMiddleware>,
    pub security_headers: Arc<SecurityHeadersMiddleware>,
}

impl RouteDependencies {
    pub fn new(config: AppConfig, services: AppServices, monitoring: Arc<MonitoringAdapter>) -> Self {
        Self {
            rate_limit: Arc::new(RateLimitMiddleware::new(&config.rate_limit)),
            security_headers: Arc::new(SecurityHeadersMiddleware::new(&config)),
            health_use_case: Arc::new(HealthCheckUseCase::new()),
            monitoring,
            services,
            config,
        }
    }
}

/// Route builder that orchestrates the creation of all application routes
pub struct RouteBuilder;

impl RouteBuilder {
    pub fn build_routes(deps: RouteDependencies) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let cookie = SessionCookie::new(deps.config.session.clone());
        let graphql_state = GraphqlState {
            schema: build_schema(deps.services.clone(), cookie.clone()),
            cookie: Arc::new(cookie),
            rate_limit: deps.rate_limit.clone(),
            monitoring: deps.monitoring.clone(),
            security_headers: deps.security_headers.clone(),
            max_upload_size: usize::try_from(deps.config.uploads.max_file_size).unwrap_or(usize::MAX),
        };

        let graphql = GraphqlRoutes::create_graphql_route(deps.config.clone(), graphql_state);
        let graphiql = GraphqlRoutes::create_graphiql_route();

        let process_payment = PaymentsRoutes::create_process_payment_route(
            deps.config.clone(),
            deps.services.clone(),
            deps.rate_limit.clone(),
            deps.security_headers.clone(),
        );
        let webhook = PaymentsRoutes::create_webhook_route(
            deps.services.clone(),
            deps.monitoring.clone(),
            deps.security_headers.clone(),
        );

        let health = MonitoringRoutes::create_health_route(
            deps.health_use_case.clone(),
            deps.services.clone(),
            deps.monitoring.clone(),
            deps.security_headers.clone(),
        );
        let metrics = MonitoringRoutes::create_prometheus_route(deps.monitoring, deps.security_headers.clone());
        let uploads = MonitoringRoutes::create_uploads_route(&deps.config.uploads.root_dir, deps.security_headers);

        graphql
            .or(graphiql)
            .or(process_payment)
            .or(webhook)
            .or(health)
            .or(metrics)
            .or(uploads)
    }
}
