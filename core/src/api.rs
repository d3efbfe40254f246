//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `bft_core::api` instead of reaching into internal modules.

pub use crate::config::{
    AppConfig, AuthConfig, DirectLineConfig, ExecutorConfig, HttpServerConfig, LoggingConfig,
    SuiteConfig,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::errors::{
    CliError, ConfigError, ExecutorError, OrchestrationError, ParseError, StoreError,
};
pub use crate::executor::{TestExecutor, TranscriptLoader};
pub use crate::results::{
    OutcomeKind, ResultsStore, RunId, RunRecord, RunStatus, StoreCounts, SuiteVerdict, TestOutcome,
};
pub use crate::suite::{
    materialize, parse_suite_request, parse_test_request, parse_transcript, RetentionReaper, Role,
    SuiteDefinition, SuiteOrchestrator, TestCase, TestDefinition, TranscriptSource, TranscriptTurn,
};
