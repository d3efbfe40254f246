use std::sync::Arc;

use futures::future::try_join_all;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SuiteConfig;
use crate::context::Services;
use crate::errors::{ExecutorError, OrchestrationError};
use crate::executor::TranscriptLoader;
use crate::results::{ResultsStore, RunId, RunRecord, TestOutcome};

use super::reaper::RetentionReaper;
use super::types::{SuiteDefinition, TestCase, TestDefinition, TranscriptSource};

/// Loads a test's transcript if it is referenced by URL.
pub async fn materialize(
    def: &TestDefinition,
    loader: &dyn TranscriptLoader,
) -> Result<TestCase, ExecutorError> {
    let transcript = match &def.transcript {
        TranscriptSource::Inline(turns) => turns.clone(),
        TranscriptSource::Url(url) => loader.load(url).await?,
    };
    Ok(TestCase::from_definition(def, transcript))
}

/// Drives suite runs from allocation to their single terminal record.
///
/// Per-test executor errors become `error` outcomes and the suite verdict is
/// `failure`. Systemic executor errors, transcript loading failures and
/// panics abort the run with verdict `error`.
pub struct SuiteOrchestrator {
    store: Arc<ResultsStore>,
    services: Services,
    reaper: RetentionReaper,
    max_parallel: usize,
}

impl SuiteOrchestrator {
    pub fn new(store: Arc<ResultsStore>, services: Services, cfg: &SuiteConfig) -> Self {
        let reaper = RetentionReaper::new(Arc::clone(&store), cfg.retention());
        Self {
            store,
            services,
            reaper,
            max_parallel: cfg.max_parallel_tests.max(1),
        }
    }

    pub fn store(&self) -> &Arc<ResultsStore> {
        &self.store
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Allocates a run id and starts the suite in the background. Returns
    /// before any test has run.
    pub fn submit(self: &Arc<Self>, suite: SuiteDefinition) -> RunId {
        let run_id = self.store.allocate();
        self.start(run_id.clone(), suite);
        run_id
    }

    /// Starts an already allocated run in the background.
    pub fn start(
        self: &Arc<Self>,
        run_id: RunId,
        suite: SuiteDefinition,
    ) -> JoinHandle<Option<Arc<RunRecord>>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run_to_completion(run_id, suite).await })
    }

    /// Runs the suite, publishes its record and schedules its deletion.
    /// Returns `None` if the record could not be published (the run was
    /// deleted or already finished).
    pub async fn run_to_completion(
        self: Arc<Self>,
        run_id: RunId,
        suite: SuiteDefinition,
    ) -> Option<Arc<RunRecord>> {
        info!(
            run_id = %run_id,
            suite = %suite.name,
            tests = suite.tests.len(),
            "Started suite run"
        );

        // A panic anywhere in the run surfaces here as a JoinError.
        let worker = {
            let this = Arc::clone(&self);
            tokio::spawn(async move { this.run_tests(&suite).await })
        };
        let record = match worker.await {
            Ok(Ok(results)) => RunRecord::completed(run_id.clone(), results),
            Ok(Err(err)) => {
                warn!(run_id = %run_id, error = %err, "Error occurred during suite run");
                RunRecord::errored(run_id.clone(), format!("Error while running test suite: {err}"))
            }
            Err(join_err) => {
                let err = OrchestrationError::Aborted(join_err.to_string());
                warn!(run_id = %run_id, error = %err, "Suite run aborted");
                RunRecord::errored(run_id.clone(), format!("Error while running test suite: {err}"))
            }
        };

        match self.store.write_result(record) {
            Ok(record) => {
                info!(
                    run_id = %run_id,
                    verdict = ?record.verdict,
                    retention_secs = self.reaper.delay().as_secs(),
                    "Finished suite run"
                );
                self.reaper.schedule(Arc::clone(&record));
                Some(record)
            }
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "Suite result discarded");
                None
            }
        }
    }

    /// Runs one test to completion in the caller's task.
    pub async fn run_single(&self, def: &TestDefinition) -> Result<TestOutcome, ExecutorError> {
        let case = materialize(def, self.services.loader.as_ref()).await?;
        self.services.executor.execute(&case).await
    }

    async fn run_tests(&self, suite: &SuiteDefinition) -> Result<Vec<TestOutcome>, OrchestrationError> {
        let loader = self.services.loader.as_ref();
        let cases = try_join_all(suite.tests.iter().map(|def| async move {
            materialize(def, loader)
                .await
                .map_err(|source| OrchestrationError::Materialize {
                    test: def.name.clone(),
                    source,
                })
        }))
        .await?;

        let total = cases.len();
        let sem = Arc::new(Semaphore::new(self.max_parallel));
        let mut futs: FuturesUnordered<_> = FuturesUnordered::new();

        for (idx, case) in cases.into_iter().enumerate() {
            let sem = Arc::clone(&sem);
            let executor = Arc::clone(&self.services.executor);

            futs.push(async move {
                let _permit = sem.acquire_owned().await.map_err(|_| {
                    OrchestrationError::Aborted("test semaphore closed unexpectedly".into())
                })?;
                debug!(test = %case.name, executor = executor.name(), "Dispatching test");
                match executor.execute(&case).await {
                    Ok(outcome) => Ok((idx, outcome)),
                    Err(err) if err.is_systemic() => Err(OrchestrationError::Systemic {
                        test: case.name.clone(),
                        source: err,
                    }),
                    Err(err) => {
                        debug!(test = %case.name, error = %err, "Test execution error");
                        Ok((idx, TestOutcome::error(case.name.clone(), err.to_string())))
                    }
                }
            });
        }

        // Outcomes arrive in completion order; report them in submission order.
        let mut slots: Vec<Option<TestOutcome>> = vec![None; total];
        while let Some(res) = futs.next().await {
            let (idx, outcome) = res?;
            slots[idx] = Some(outcome);
        }
        slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| OrchestrationError::Aborted("test produced no outcome".into()))
            })
            .collect()
    }
}
