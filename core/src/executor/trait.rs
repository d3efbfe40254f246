use async_trait::async_trait;

use crate::errors::ExecutorError;
use crate::results::TestOutcome;
use crate::suite::{TestCase, TranscriptTurn};

/// Runs a single test against a bot.
///
/// A returned `Ok` outcome may still be a failing test. `Err` means the
/// executor itself could not finish the test; see
/// [`ExecutorError::is_systemic`] for how the orchestrator treats it.
#[async_trait]
pub trait TestExecutor: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, test: &TestCase) -> Result<TestOutcome, ExecutorError>;
}

/// Fetches transcripts referenced by URL.
#[async_trait]
pub trait TranscriptLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<Vec<TranscriptTurn>, ExecutorError>;
}
