//! Application state management

use gatehouse_core::AppConfig;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::backend::{AuthBackend, ProfileBackend};

/// Per-endpoint request statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct EndpointMetrics {
    pub requests: u64,
    /// Response counts keyed by status code
    pub status_counts: HashMap<u16, u64>,
    pub total_latency_us: u64,
    pub max_latency_us: u64,
}

impl EndpointMetrics {
    pub fn average_latency_us(&self) -> u64 {
        if self.requests == 0 {
            0
        } else {
            self.total_latency_us / self.requests
        }
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Credential backend (login, registration, token verification)
    pub auth: Arc<dyn AuthBackend>,
    /// Profile and address backend
    pub profiles: Arc<dyn ProfileBackend>,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Request statistics keyed by route template
    pub metrics: RwLock<HashMap<String, EndpointMetrics>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthBackend>,
        profiles: Arc<dyn ProfileBackend>,
    ) -> Self {
        Self {
            config,
            auth,
            profiles,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            metrics: RwLock::new(HashMap::new()),
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

    /// Record one finished request against its endpoint
    pub async fn record_request(&self, endpoint: String, status: u16, latency_us: u64) {
        let mut metrics = self.metrics.write().await;
        let entry = metrics.entry(endpoint).or_default();
        entry.requests += 1;
        *entry.status_counts.entry(status).or_insert(0) += 1;
        entry.total_latency_us += latency_us;
        entry.max_latency_us = entry.max_latency_us.max(latency_us);
    }

    /// Copy of the per-endpoint statistics
    pub async fn endpoint_metrics(&self) -> HashMap<String, EndpointMetrics> {
        self.metrics.read().await.clone()
    }
}
