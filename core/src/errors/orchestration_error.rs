// core/src/errors/orchestration_error.rs
use thiserror::Error;

use super::ExecutorError;

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("could not materialize test '{test}': {source}")]
    Materialize {
        test: String,
        #[source]
        source: ExecutorError,
    },

    #[error("executor fault on test '{test}': {source}")]
    Systemic {
        test: String,
        #[source]
        source: ExecutorError,
    },

    #[error("orchestration task aborted: {0}")]
    Aborted(String),
}
