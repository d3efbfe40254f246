// core/src/errors/executor_error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("bot channel rejected credentials (status {status})")]
    Unauthorized { status: u16 },

    #[error("bot channel unavailable (status {status})")]
    Unavailable { status: u16, body_snippet: String },

    #[error("no secret configured for bot: {0}")]
    UnknownBot(String),

    #[error("unexpected status: {status}")]
    HttpStatus { status: u16, body_snippet: String },

    #[error("transcript could not be loaded from {url}: {reason}")]
    Transcript { url: String, reason: String },

    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("decode/serde error: {0}")]
    Decode(#[source] anyhow::Error),
}

impl ExecutorError {
    /// Systemic errors mean the whole suite cannot run, not that one test broke.
    pub fn is_systemic(&self) -> bool {
        matches!(
            self,
            ExecutorError::Unauthorized { .. }
                | ExecutorError::Unavailable { .. }
                | ExecutorError::UnknownBot(_)
        )
    }
}
