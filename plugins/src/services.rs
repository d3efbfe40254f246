//! Builds the executor and transcript loader from configuration for the CLI.
use bft_core::api::{AppConfig, Services, ServicesFactory};

use crate::factory;

pub struct PluginServicesFactory;

impl Default for PluginServicesFactory {
    fn default() -> Self {
        Self
    }
}

impl ServicesFactory for PluginServicesFactory {
    fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services> {
        let executor = factory::build_executor(cfg)?;
        let loader = factory::build_loader(cfg)?;
        Ok(Services { executor, loader })
    }
}
