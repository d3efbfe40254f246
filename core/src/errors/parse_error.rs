// core/src/errors/parse_error.rs
use thiserror::Error;

/// Input errors: the submitted test or suite definition cannot be used at all.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid json body")]
    InvalidJson(#[source] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("fields are mutually exclusive: {0}")]
    Conflict(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("suite contains no tests")]
    EmptySuite,

    #[error("transcript is empty")]
    EmptyTranscript,
}
