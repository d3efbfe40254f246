//! Response payloads.

use bft_core::api::{SuiteVerdict, TestOutcome};
use serde::Serialize;
use std::collections::HashMap;

pub const RUN_NOT_FOUND: &str = "RunId does not exist.";
pub const SUITE_INPUT_INVALID: &str = "Could not get tests data from request";
pub const TESTS_RUNNING: &str = "Tests are running.";
pub const TESTS_STILL_RUNNING: &str = "Tests are still running.";

/// Same shape as a run record, used when there is no run to report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictErrorBody {
    pub results: Vec<TestOutcome>,
    pub error_message: String,
    pub verdict: SuiteVerdict,
}

impl VerdictErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            error_message: message.into(),
            verdict: SuiteVerdict::Error,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: f64,
    pub requests_handled: u64,
    pub errors_total: u64,
    pub requests_by_path: HashMap<String, u64>,
    pub active_runs: usize,
    pub finished_runs: usize,
    pub timestamp: String,
}
