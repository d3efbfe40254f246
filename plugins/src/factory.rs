use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use bft_core::api::{AppConfig, ExecutorConfig, TestExecutor, TranscriptLoader};

use crate::executor::{DirectLineExecutor, HttpTranscriptLoader};

pub fn build_executor(cfg: &AppConfig) -> Result<Arc<dyn TestExecutor>> {
    match &cfg.executor {
        ExecutorConfig::DirectLine(dl_cfg) => Ok(Arc::new(DirectLineExecutor::new(dl_cfg)?)),
    }
}

pub fn build_loader(cfg: &AppConfig) -> Result<Arc<dyn TranscriptLoader>> {
    let ExecutorConfig::DirectLine(dl_cfg) = &cfg.executor;
    let timeout = Duration::from_millis(dl_cfg.default_timeout_ms);
    Ok(Arc::new(HttpTranscriptLoader::new(timeout)?))
}
