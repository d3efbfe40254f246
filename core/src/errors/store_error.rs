// core/src/errors/store_error.rs
use thiserror::Error;

use crate::results::RunId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("run is not active: {0}")]
    UnknownRun(RunId),

    #[error("run is already active: {0}")]
    AlreadyActive(RunId),

    #[error("run already has a result: {0}")]
    AlreadyFinished(RunId),
}
