use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::RunId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Pass,
    Fail,
    Error,
}

/// Result of one test, produced exactly once by the executor (or by the
/// orchestrator on the executor's behalf when it faults).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub name: String,
    pub outcome: OutcomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl TestOutcome {
    pub fn pass(name: impl Into<String>) -> Self {
        Self::new(name.into(), OutcomeKind::Pass, None)
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name.into(), OutcomeKind::Fail, Some(message.into()))
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name.into(), OutcomeKind::Error, Some(message.into()))
    }

    pub fn with_mismatch(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn is_pass(&self) -> bool {
        self.outcome == OutcomeKind::Pass
    }

    fn new(name: String, outcome: OutcomeKind, message: Option<String>) -> Self {
        Self {
            name,
            outcome,
            message,
            expected: None,
            actual: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteVerdict {
    Pending,
    Success,
    Failure,
    Error,
}

impl SuiteVerdict {
    /// Success iff every outcome passed; independent of outcome order.
    pub fn from_outcomes(outcomes: &[TestOutcome]) -> Self {
        if outcomes.iter().all(TestOutcome::is_pass) {
            SuiteVerdict::Success
        } else {
            SuiteVerdict::Failure
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, SuiteVerdict::Pending)
    }
}

/// Terminal record of a run. Serializes to the poll body
/// `{results, errorMessage, verdict}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    #[serde(skip_serializing)]
    pub run_id: RunId,
    pub results: Vec<TestOutcome>,
    pub error_message: Option<String>,
    pub verdict: SuiteVerdict,
    #[serde(skip_serializing)]
    pub finished_at: DateTime<Local>,
}

impl RunRecord {
    pub fn completed(run_id: RunId, results: Vec<TestOutcome>) -> Self {
        let verdict = SuiteVerdict::from_outcomes(&results);
        Self {
            run_id,
            results,
            error_message: None,
            verdict,
            finished_at: Local::now(),
        }
    }

    pub fn errored(run_id: RunId, message: impl Into<String>) -> Self {
        Self {
            run_id,
            results: Vec::new(),
            error_message: Some(message.into()),
            verdict: SuiteVerdict::Error,
            finished_at: Local::now(),
        }
    }
}
