//! Monitoring adapter for metrics and observability
//!
//! Prometheus metrics for the GraphQL endpoint, the payment webhook and the
//! rate limiter, plus the in-process summary shown by the health endpoint.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::shared::error::{AppError, AppResult};
use crate::shared::metrics::{Metrics, MetricsUtils};

/// Adapter for monitoring and metrics services
pub struct MonitoringAdapter {
    registry: Registry,
    graphql_requests: IntCounterVec,
    graphql_latency: Histogram,
    webhook_notifications: IntCounterVec,
    rate_limited_requests: IntCounter,
    summary: MetricsUtils,
}

fn metric_error(e: prometheus::Error) -> AppError {
    AppError::Internal(format!("Failed to register metric: {}", e))
}

impl MonitoringAdapter {
    pub fn new() -> AppResult<Self> {
        let registry = Registry::new();

        let graphql_requests = IntCounterVec::new(
            Opts::new("graphql_requests_total", "GraphQL requests by outcome"),
            &["outcome"],
        )
        .map_err(metric_error)?;

        let graphql_latency = Histogram::with_opts(HistogramOpts::new(
            "graphql_response_time_seconds",
            "GraphQL response time in seconds",
        ))
        .map_err(metric_error)?;

        let webhook_notifications = IntCounterVec::new(
            Opts::new("payment_webhook_notifications_total", "Payment notifications by outcome"),
            &["outcome"],
        )
        .map_err(metric_error)?;

        let rate_limited_requests = IntCounter::new(
            "rate_limited_requests_total",
            "Requests rejected by the rate limiter",
        )
        .map_err(metric_error)?;

        registry.register(Box::new(graphql_requests.clone())).map_err(metric_error)?;
        registry.register(Box::new(graphql_latency.clone())).map_err(metric_error)?;
        registry.register(Box::new(webhook_notifications.clone())).map_err(metric_error)?;
        registry.register(Box::new(rate_limited_requests.clone())).map_err(metric_error)?;

        Ok(Self {
            registry,
            graphql_requests,
            graphql_latency,
            webhook_notifications,
            rate_limited_requests,
            summary: MetricsUtils::new(),
        })
    }

    /// Record a finished GraphQL request
    pub fn record_graphql_request(&self, success: bool, duration_ms: u64) {
        let outcome = if success { "ok" } else { "error" };
        self.graphql_requests.with_label_values(&[outcome]).inc();
        self.graphql_latency.observe(duration_ms as f64 / 1000.0);
        self.summary.record_request(success, duration_ms);
    }

    /// Record a processed webhook notification by outcome label
    pub fn record_webhook(&self, outcome: &str) {
        self.webhook_notifications.with_label_values(&[outcome]).inc();
        self.summary.increment_webhook_notifications();
    }

    pub fn record_rate_limited_request(&self) {
        self.rate_limited_requests.inc();
        self.summary.increment_rate_limited_requests();
    }

    /// Get Prometheus metrics in text format
    pub fn get_prometheus_metrics(&self) -> AppResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| AppError::Internal(format!("Metrics are not UTF-8: {}", e)))
    }

    pub fn get_metrics(&self) -> Metrics {
        self.summary.get_metrics()
    }
}
