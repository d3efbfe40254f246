mod cli_error;
mod config_error;
mod executor_error;
mod orchestration_error;
mod parse_error;
mod store_error;

pub use cli_error::CliError;
pub use config_error::ConfigError;
pub use executor_error::ExecutorError;
pub use orchestration_error::OrchestrationError;
pub use parse_error::ParseError;
pub use store_error::StoreError;
