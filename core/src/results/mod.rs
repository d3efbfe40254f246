mod run_id;
mod store;
mod types;

pub use run_id::RunId;
pub use store::{ResultsStore, RunStatus, StoreCounts};
pub use types::{OutcomeKind, RunRecord, SuiteVerdict, TestOutcome};
