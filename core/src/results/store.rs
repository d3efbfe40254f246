use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Local};

use crate::errors::StoreError;

use super::{RunId, RunRecord};

#[derive(Debug, Clone)]
enum RunState {
    Running { started_at: DateTime<Local> },
    Finished(Arc<RunRecord>),
}

/// What a poller can observe for a run id.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// Never allocated, or already deleted.
    Unknown,
    Running,
    Finished(Arc<RunRecord>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub running: usize,
    pub finished: usize,
}

/// Concurrency-safe map from run id to run state.
///
/// Records are published whole behind an `Arc`, so a reader either sees no
/// record or a complete one. Deleting a run never invalidates a snapshot a
/// reader already holds.
#[derive(Debug, Default)]
pub struct ResultsStore {
    runs: RwLock<HashMap<RunId, RunState>>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh run id and marks it active in one step.
    pub fn allocate(&self) -> RunId {
        self.allocate_with(RunId::generate)
    }

    /// Draws ids from `next` until one is not active.
    pub fn allocate_with(&self, mut next: impl FnMut() -> RunId) -> RunId {
        let mut runs = self.write();
        loop {
            let candidate = next();
            if let Entry::Vacant(slot) = runs.entry(candidate.clone()) {
                slot.insert(RunState::Running {
                    started_at: Local::now(),
                });
                return candidate;
            }
            tracing::debug!(run_id = %candidate, "run id collision, drawing again");
        }
    }

    pub fn mark_active(&self, run_id: &RunId) -> Result<(), StoreError> {
        match self.write().entry(run_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyActive(run_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(RunState::Running {
                    started_at: Local::now(),
                });
                Ok(())
            }
        }
    }

    pub fn is_active(&self, run_id: &RunId) -> bool {
        self.read().contains_key(run_id)
    }

    /// Publishes the terminal record of an active run. A run accepts exactly
    /// one record.
    pub fn write_result(&self, record: RunRecord) -> Result<Arc<RunRecord>, StoreError> {
        let mut runs = self.write();
        let Some(state) = runs.get_mut(&record.run_id) else {
            return Err(StoreError::UnknownRun(record.run_id));
        };
        let started_at = match state {
            RunState::Finished(_) => return Err(StoreError::AlreadyFinished(record.run_id)),
            RunState::Running { started_at } => *started_at,
        };
        tracing::debug!(
            run_id = %record.run_id,
            elapsed_ms = (record.finished_at - started_at).num_milliseconds(),
            "publishing run record"
        );
        let record = Arc::new(record);
        *state = RunState::Finished(Arc::clone(&record));
        Ok(record)
    }

    /// The terminal record, if any. `None` covers both unknown and still
    /// running ids; use [`is_active`](Self::is_active) or
    /// [`status`](Self::status) to tell them apart.
    pub fn read_result(&self, run_id: &RunId) -> Option<Arc<RunRecord>> {
        match self.read().get(run_id) {
            Some(RunState::Finished(record)) => Some(Arc::clone(record)),
            _ => None,
        }
    }

    pub fn status(&self, run_id: &RunId) -> RunStatus {
        match self.read().get(run_id) {
            None => RunStatus::Unknown,
            Some(RunState::Running { .. }) => RunStatus::Running,
            Some(RunState::Finished(record)) => RunStatus::Finished(Arc::clone(record)),
        }
    }

    /// Removes the run and its record. Returns whether anything was removed;
    /// deleting an unknown id is a no-op.
    pub fn delete(&self, run_id: &RunId) -> bool {
        self.write().remove(run_id).is_some()
    }

    /// Removes the run only if it still holds exactly `record`.
    pub fn expire(&self, run_id: &RunId, record: &Arc<RunRecord>) -> bool {
        let mut runs = self.write();
        match runs.get(run_id) {
            Some(RunState::Finished(current)) if Arc::ptr_eq(current, record) => {
                runs.remove(run_id);
                true
            }
            _ => false,
        }
    }

    pub fn counts(&self) -> StoreCounts {
        self.read()
            .values()
            .fold(StoreCounts::default(), |mut acc, state| {
                match state {
                    RunState::Running { .. } => acc.running += 1,
                    RunState::Finished(_) => acc.finished += 1,
                }
                acc
            })
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<RunId, RunState>> {
        self.runs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<RunId, RunState>> {
        self.runs.write().unwrap_or_else(PoisonError::into_inner)
    }
}
