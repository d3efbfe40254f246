use std::sync::Arc;

use crate::config::AppConfig;
use crate::executor::{TestExecutor, TranscriptLoader};
use crate::results::ResultsStore;
use crate::suite::SuiteOrchestrator;

/// The collaborators a run needs, built from configuration by a
/// [`ServicesFactory`].
#[derive(Clone)]
pub struct Services {
    pub executor: Arc<dyn TestExecutor>,
    pub loader: Arc<dyn TranscriptLoader>,
}

pub trait ServicesFactory {
    fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    store: Arc<ResultsStore>,
}

impl AppContext {
    pub fn new(cfg: AppConfig) -> Self {
        Self {
            cfg,
            store: Arc::new(ResultsStore::new()),
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn store(&self) -> Arc<ResultsStore> {
        Arc::clone(&self.store)
    }

    pub fn build_services(&self, factory: &dyn ServicesFactory) -> anyhow::Result<Services> {
        factory.build_services(&self.cfg)
    }

    pub fn orchestrator(&self, services: Services) -> Arc<SuiteOrchestrator> {
        Arc::new(SuiteOrchestrator::new(
            self.store(),
            services,
            &self.cfg.suite,
        ))
    }
}
