//! Metrics utilities module
//!
//! In-process counters reported by the health endpoint. The Prometheus
//! registry lives in `MonitoringAdapter`.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

/// Snapshot of the request counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    /// Total GraphQL requests processed
    pub total_requests: u64,

    /// Requests that finished without errors
    pub successful_requests: u64,

    /// Requests whose response carried errors
    pub failed_requests: u64,

    /// Requests rejected by the rate limiter
    pub rate_limited_requests: u64,

    /// Webhook notifications received
    pub webhook_notifications: u64,

    /// Average response time in milliseconds
    pub avg_response_time_ms: f64,

    /// Uptime in seconds
    pub uptime_seconds: u64,
}

/// Metrics utilities for the application
pub struct MetricsUtils {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    rate_limited_requests: AtomicU64,
    webhook_notifications: AtomicU64,
    total_response_time: AtomicU64,
    response_count: AtomicU64,
    start_time: SystemTime,
}

impl MetricsUtils {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            rate_limited_requests: AtomicU64::new(0),
            webhook_notifications: AtomicU64::new(0),
            total_response_time: AtomicU64::new(0),
            response_count: AtomicU64::new(0),
            start_time: SystemTime::now(),
        }
    }

    /// Record a finished GraphQL request
    pub fn record_request(&self, success: bool, duration_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
        self.total_response_time.fetch_add(duration_ms, Ordering::Relaxed);
        self.response_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rate_limited_requests(&self) {
        self.rate_limited_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_webhook_notifications(&self) {
        self.webhook_notifications.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics
    pub fn get_metrics(&self) -> Metrics {
        let total_response_time = self.total_response_time.load(Ordering::Relaxed);
        let response_count = self.response_count.load(Ordering::Relaxed);

        let avg_response_time_ms = if response_count > 0 {
            total_response_time as f64 / response_count as f64
        } else {
            0.0
        };

        let uptime = SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();

        Metrics {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            rate_limited_requests: self.rate_limited_requests.load(Ordering::Relaxed),
            webhook_notifications: self.webhook_notifications.load(Ordering::Relaxed),
            avg_response_time_ms,
            uptime_seconds: uptime,
        }
    }
}

impl Default for MetricsUtils {
    fn default() -> Self {
        Self::new()
    }
}
