//! HTTP server implementation
//!
//! The server is meant to run behind a reverse proxy that terminates TLS;
//! CORS and security headers are still applied here because the frontend
//! talks to it directly in development.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use warp::{Filter, Reply};

use crate::application::services::{AppServices, ServiceDependencies};
use crate::config::AppConfig;
use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::responses::handle_rejection;
use crate::infrastructure::http::routes::{RouteBuilder, RouteDependencies};
use crate::middleware::CorsMiddleware;
use crate::shared::error::{AppError, AppResult};

pub struct HttpServer {
    config: AppConfig,
    services: AppServices,
    monitoring: Arc<MonitoringAdapter>,
}

impl HttpServer {
    /// Connect every adapter selected by configuration
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let deps = ServiceDependencies::from_config(&config).await?;
        Self::with_dependencies(config, deps)
    }

    /// Build the server around already constructed adapters
    pub fn with_dependencies(config: AppConfig, deps: ServiceDependencies) -> AppResult<Self> {
        let services = AppServices::new(&config, deps);
        let monitoring = Arc::new(MonitoringAdapter::new()?);
        Ok(Self {
            config,
            services,
            monitoring,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn services(&self) -> &AppServices {
        &self.services
    }

    /// Every route with CORS and rejection handling applied
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = std::convert::Infallible> + Clone {
        let cors = CorsMiddleware::new(&self.config);
        if let Err(e) = cors.validate_config() {
            warn!(error = %e, "CORS configuration is questionable");
        }

        let deps = RouteDependencies::new(self.config.clone(), self.services.clone(), self.monitoring.clone());
        RouteBuilder::build_routes(deps)
            .with(cors.build())
            .recover(handle_rejection)
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> AppResult<()> {
        let addr: std::net::SocketAddr = self
            .config
            .server_address()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;

        let reconciled = self.services.catalog.reconcile_memberships().await?;
        if reconciled > 0 {
            warn!(links = reconciled, "Repaired muscle group memberships at startup");
        }

        info!(%addr, "Starting HTTP server");
        warp::serve(self.routes()).run(addr).await;
        Ok(())
    }
}
