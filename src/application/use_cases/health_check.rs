use serde_json::json;
use tracing::warn;

use crate::domain::health::*;
use crate::infrastructure::adapters::{MonitoringAdapter, Store};
use crate::shared::error::AppResult;

/// Health check use case
pub struct HealthCheckUseCase;

impl HealthCheckUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Report liveness together with document store reachability
    pub async fn execute(&self, store: &Store, monitoring: Option<&MonitoringAdapter>) -> AppResult<HealthResponse> {
        let mut status = HealthStatus::Healthy;
        let mut details = json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
        });

        match store.ping().await {
            Ok(()) => {
                details["store"] = json!({ "status": "connected" });
            }
            Err(e) => {
                warn!(error = %e, "Document store health check failed");
                status = HealthStatus::Unhealthy;
                details["store"] = json!({
                    "status": "disconnected",
                    "error": e.public_message(),
                });
            }
        }

        if let Some(monitoring) = monitoring {
            let metrics = monitoring.get_metrics();
            details["uptime"] = json!(Self::format_uptime(metrics.uptime_seconds));
            details["requests"] = json!({
                "total": metrics.total_requests,
                "failed": metrics.failed_requests,
                "rate_limited": metrics.rate_limited_requests,
                "avg_response_time_ms": metrics.avg_response_time_ms,
            });
        }

        Ok(HealthResponse { status, details })
    }

    fn format_uptime(seconds: u64) -> String {
        let days = seconds / 86400;
        let hours = (seconds % 86400) / 3600;
        let minutes = (seconds % 3600) / 60;
        format!("{}d {}h {}m", days, hours, minutes)
    }
}

impl Default for HealthCheckUseCase {
    fn default() -> Self {
        Self::new()
    }
}
