use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::results::{ResultsStore, RunRecord};

/// Deletes finished runs once their retention window has passed.
#[derive(Debug, Clone)]
pub struct RetentionReaper {
    store: Arc<ResultsStore>,
    delay: Duration,
}

impl RetentionReaper {
    pub fn new(store: Arc<ResultsStore>, delay: Duration) -> Self {
        Self { store, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// One-shot deletion of `record`'s run after the retention delay. If the
    /// run was already removed (for example by a client consuming an error
    /// verdict) the task does nothing.
    pub fn schedule(&self, record: Arc<RunRecord>) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if store.expire(&record.run_id, &record) {
                tracing::info!(run_id = %record.run_id, "Deleted suite results");
            } else {
                tracing::debug!(run_id = %record.run_id, "suite results already removed");
            }
        })
    }
}
