//! Application state management

use ixt_core::config::AppConfig;
use ixt_extractor::Pipeline;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Per-endpoint request statistics
#[derive(Debug, Clone, Default)]
pub struct EndpointMetrics {
    /// Requests by response status
    pub status_counts: HashMap<u16, u64>,
    /// Sum of latencies in microseconds
    pub total_latency_us: u64,
    /// Number of latency samples
    pub latency_count: u64,
    /// Slowest request in microseconds
    pub max_latency_us: u64,
}

impl EndpointMetrics {
    pub fn avg_latency_ms(&self) -> f64 {
        if self.latency_count == 0 {
            return 0.0;
        }
        self.total_latency_us as f64 / self.latency_count as f64 / 1000.0
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Ready status; false until the listener is bound and again once shutdown starts
    pub is_ready: AtomicBool,
    /// Classifier + extractor, loaded once at start-up
    pub pipeline: Arc<Pipeline>,
    /// Per-endpoint metrics
    pub metrics: RwLock<HashMap<String, EndpointMetrics>>,
    /// Successful extractions by predicted category
    pub category_counts: RwLock<HashMap<String, u64>>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, pipeline: Arc<Pipeline>) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            is_ready: AtomicBool::new(false),
            pipeline,
            metrics: RwLock::new(HashMap::new()),
            category_counts: RwLock::new(HashMap::new()),
        }
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if service is ready
    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::SeqCst)
    }

    /// Set ready status
    pub fn set_ready(&self, ready: bool) {
        self.is_ready.store(ready, Ordering::SeqCst);
    }

    /// Upper bound for one classify + extract run
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.config.models.inference_timeout_ms)
    }

    /// Record a finished request
    pub async fn record_request(&self, endpoint: String, status: u16, latency_us: u64) {
        let mut metrics = self.metrics.write().await;
        let entry = metrics.entry(endpoint).or_default();
        *entry.status_counts.entry(status).or_insert(0) += 1;
        entry.total_latency_us += latency_us;
        entry.latency_count += 1;
        entry.max_latency_us = entry.max_latency_us.max(latency_us);
    }

    /// Count a successful extraction for its category
    pub async fn record_category(&self, category: &str) {
        let mut counts = self.category_counts.write().await;
        *counts.entry(category.to_string()).or_insert(0) += 1;
    }
}
