// core/src/errors/cli_error.rs
use thiserror::Error;

use super::{ConfigError, ParseError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid suite definition: {0}")]
    Parse(#[from] ParseError),

    #[error("service setup failed: {0}")]
    Services(#[source] anyhow::Error),

    #[error("command failed: {0}")]
    Command(String),
}
