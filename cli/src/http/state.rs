//! Shared state handed to every handler.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use bft_core::api::{AppConfig, SuiteOrchestrator};
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SuiteOrchestrator>,
    pub config: Arc<AppConfig>,
    pub stats: Arc<RwLock<ServerStats>>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<SuiteOrchestrator>,
        config: AppConfig,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            orchestrator,
            config: Arc::new(config),
            stats: Arc::new(RwLock::new(ServerStats::new())),
            shutdown_tx,
        }
    }

    pub fn record_request(&self, path: &str) {
        if let Ok(mut stats) = self.stats.write() {
            stats.increment_request(path);
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.increment_error();
        }
    }
}

#[derive(Debug)]
pub struct ServerStats {
    pub started_at: Instant,
    pub requests_total: u64,
    pub errors_total: u64,
    pub requests_by_path: HashMap<String, u64>,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            requests_total: 0,
            errors_total: 0,
            requests_by_path: HashMap::new(),
        }
    }

    pub fn increment_request(&mut self, path: &str) {
        self.requests_total += 1;
        *self.requests_by_path.entry(path.to_string()).or_insert(0) += 1;
    }

    pub fn increment_error(&mut self) {
        self.errors_total += 1;
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
