//! Integration tests for suite orchestration
//!
//! These tests drive whole runs through the store, the orchestrator and the
//! reaper with a scripted executor.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bft_core::api::{
    ExecutorError, OutcomeKind, ResultsStore, RunStatus, Services, SuiteConfig, SuiteDefinition,
    SuiteOrchestrator, SuiteVerdict, TestCase, TestDefinition, TestExecutor, TestOutcome,
    TranscriptLoader, TranscriptSource, TranscriptTurn,
};
use pretty_assertions::assert_eq;
use tokio::sync::Semaphore;

/// Outcome is chosen by the test name prefix; `name:ms` adds a delay.
struct ScriptedExecutor {
    gate: Option<Arc<Semaphore>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExecutor {
    fn new() -> Self {
        Self {
            gate: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }
}

#[async_trait]
impl TestExecutor for ScriptedExecutor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&self, test: &TestCase) -> Result<TestOutcome, ExecutorError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if let Some((_, ms)) = test.name.split_once(':') {
            tokio::time::sleep(Duration::from_millis(ms.parse().unwrap())).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let name = test.name.clone();
        if name.starts_with("pass") {
            Ok(TestOutcome::pass(name))
        } else if name.starts_with("fail") {
            Ok(TestOutcome::fail(name, "reply mismatch").with_mismatch("Hello", "Bye"))
        } else if name.starts_with("err") {
            Err(ExecutorError::Transport(anyhow::anyhow!("connection reset")))
        } else if name.starts_with("sys") {
            Err(ExecutorError::Unauthorized { status: 403 })
        } else {
            panic!("scripted executor has no script for {name}")
        }
    }
}

struct StaticLoader;

#[async_trait]
impl TranscriptLoader for StaticLoader {
    async fn load(&self, url: &str) -> Result<Vec<TranscriptTurn>, ExecutorError> {
        if url.contains("missing") {
            return Err(ExecutorError::Transcript {
                url: url.to_string(),
                reason: "404 Not Found".into(),
            });
        }
        Ok(vec![TranscriptTurn::user("hi"), TranscriptTurn::bot("Hello")])
    }
}

fn suite(names: &[&str]) -> SuiteDefinition {
    SuiteDefinition {
        name: "integration".into(),
        tests: names
            .iter()
            .map(|n| TestDefinition {
                name: n.to_string(),
                bot: None,
                user_id: None,
                timeout: None,
                transcript: TranscriptSource::Inline(vec![
                    TranscriptTurn::user("hi"),
                    TranscriptTurn::bot("Hello"),
                ]),
            })
            .collect(),
    }
}

fn orchestrator(executor: Arc<ScriptedExecutor>, cfg: SuiteConfig) -> Arc<SuiteOrchestrator> {
    let services = Services {
        executor,
        loader: Arc::new(StaticLoader),
    };
    Arc::new(SuiteOrchestrator::new(
        Arc::new(ResultsStore::new()),
        services,
        &cfg,
    ))
}

fn default_orchestrator() -> Arc<SuiteOrchestrator> {
    orchestrator(Arc::new(ScriptedExecutor::new()), SuiteConfig::default())
}

async fn run(orch: &Arc<SuiteOrchestrator>, def: SuiteDefinition) -> Arc<bft_core::api::RunRecord> {
    let run_id = orch.store().allocate();
    Arc::clone(orch)
        .run_to_completion(run_id, def)
        .await
        .expect("record published")
}

#[tokio::test]
async fn all_passing_tests_yield_success_in_submission_order() {
    let executor = Arc::new(ScriptedExecutor::new());
    let orch = orchestrator(
        Arc::clone(&executor),
        SuiteConfig {
            max_parallel_tests: 3,
            ..SuiteConfig::default()
        },
    );
    let names = ["pass-a:40", "pass-b:5", "pass-c:25", "pass-d:1", "pass-e:10"];

    let record = run(&orch, suite(&names)).await;

    assert_eq!(record.verdict, SuiteVerdict::Success);
    assert_eq!(record.results.len(), names.len());
    let reported: Vec<_> = record.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(reported, names.to_vec());
    assert!(executor.max_in_flight.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn one_failing_test_yields_failure() {
    let orch = default_orchestrator();
    let record = run(&orch, suite(&["pass-1", "fail-2", "pass-3"])).await;

    assert_eq!(record.verdict, SuiteVerdict::Failure);
    assert_eq!(record.results.len(), 3);
    assert_eq!(record.results[1].outcome, OutcomeKind::Fail);
    assert_eq!(record.results[1].expected.as_deref(), Some("Hello"));
    assert!(record.error_message.is_none());
}

#[tokio::test]
async fn per_test_execution_error_is_folded_into_failure() {
    let orch = default_orchestrator();
    let record = run(&orch, suite(&["err-1", "pass-2"])).await;

    assert_eq!(record.verdict, SuiteVerdict::Failure);
    assert_eq!(record.results.len(), 2);
    assert_eq!(record.results[0].outcome, OutcomeKind::Error);
    assert!(record.results[0]
        .message
        .as_deref()
        .unwrap()
        .contains("connection reset"));
    assert_eq!(record.results[1].outcome, OutcomeKind::Pass);
}

#[tokio::test]
async fn systemic_executor_error_yields_error_verdict() {
    let orch = default_orchestrator();
    let record = run(&orch, suite(&["sys-1", "pass-2:50"])).await;

    assert_eq!(record.verdict, SuiteVerdict::Error);
    assert!(record.results.is_empty());
    assert!(record
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Error while running test suite"));
}

#[tokio::test]
async fn unloadable_transcript_yields_error_verdict() {
    let orch = default_orchestrator();
    let mut def = suite(&["pass-1"]);
    def.tests.push(TestDefinition {
        name: "pass-remote".into(),
        bot: None,
        user_id: None,
        timeout: None,
        transcript: TranscriptSource::Url("https://transcripts/missing.json".into()),
    });

    let record = run(&orch, def).await;

    assert_eq!(record.verdict, SuiteVerdict::Error);
    assert!(record.error_message.as_deref().unwrap().contains("pass-remote"));
}

#[tokio::test]
async fn panicking_executor_yields_error_verdict() {
    let orch = default_orchestrator();
    let record = run(&orch, suite(&["pass-1", "unscripted"])).await;

    assert_eq!(record.verdict, SuiteVerdict::Error);
    assert!(record.results.is_empty());
}

#[tokio::test]
async fn polls_see_running_until_the_record_is_committed() {
    let gate = Arc::new(Semaphore::new(0));
    let orch = orchestrator(
        Arc::new(ScriptedExecutor::gated(Arc::clone(&gate))),
        SuiteConfig::default(),
    );

    let run_id = orch.submit(suite(&["pass-1", "pass-2"]));
    assert!(orch.store().is_active(&run_id));
    for _ in 0..10 {
        tokio::task::yield_now().await;
        assert_eq!(orch.store().status(&run_id), RunStatus::Running);
        assert!(orch.store().read_result(&run_id).is_none());
    }

    gate.add_permits(1);
    for _ in 0..10 {
        tokio::task::yield_now().await;
        assert_eq!(orch.store().status(&run_id), RunStatus::Running);
    }

    gate.add_permits(1);
    let record = loop {
        if let Some(record) = orch.store().read_result(&run_id) {
            break record;
        }
        tokio::task::yield_now().await;
    };
    assert_eq!(record.verdict, SuiteVerdict::Success);
    assert_eq!(record.results.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn finished_run_is_deleted_after_retention() {
    let orch = orchestrator(
        Arc::new(ScriptedExecutor::new()),
        SuiteConfig {
            results_retention_seconds: 30,
            ..SuiteConfig::default()
        },
    );

    let run_id = orch.submit(suite(&["pass-1:100"]));
    assert_eq!(orch.store().status(&run_id), RunStatus::Running);

    tokio::time::sleep(Duration::from_millis(200)).await;
    match orch.store().status(&run_id) {
        RunStatus::Finished(record) => assert_eq!(record.verdict, SuiteVerdict::Success),
        other => panic!("expected finished run, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(orch.store().status(&run_id), RunStatus::Unknown);
}

#[tokio::test]
async fn deleted_run_discards_its_late_record() {
    let gate = Arc::new(Semaphore::new(0));
    let orch = orchestrator(
        Arc::new(ScriptedExecutor::gated(Arc::clone(&gate))),
        SuiteConfig::default(),
    );

    let run_id = orch.store().allocate();
    let handle = orch.start(run_id.clone(), suite(&["pass-1"]));
    assert!(orch.store().delete(&run_id));
    gate.add_permits(1);

    assert!(handle.await.unwrap().is_none());
    assert!(!orch.store().is_active(&run_id));
}

#[tokio::test]
async fn many_suites_run_concurrently() {
    let orch = default_orchestrator();
    let ids: Vec<_> = (0..50)
        .map(|i| {
            let names = if i % 2 == 0 {
                vec!["pass-a:3", "pass-b:1"]
            } else {
                vec!["pass-a:2", "fail-b:1"]
            };
            orch.submit(suite(&names))
        })
        .collect();

    for (i, id) in ids.iter().enumerate() {
        let record = loop {
            if let Some(record) = orch.store().read_result(id) {
                break record;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        };
        let expected = if i % 2 == 0 {
            SuiteVerdict::Success
        } else {
            SuiteVerdict::Failure
        };
        assert_eq!(record.verdict, expected);
    }
}
