mod orchestrator;
mod parser;
mod reaper;
mod types;

pub use orchestrator::{materialize, SuiteOrchestrator};
pub use parser::{parse_suite_request, parse_test_request, parse_transcript};
pub use reaper::RetentionReaper;
pub use types::{Role, SuiteDefinition, TestCase, TestDefinition, TranscriptSource, TranscriptTurn};
