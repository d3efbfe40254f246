//! `bft suite` - runs one suite without the HTTP surface.

use std::collections::HashMap;

use bft_core::api::{AppContext, CliError, RunRecord, SuiteVerdict};
use bft_plugins::services::PluginServicesFactory;

use crate::commands::cli::SuiteArgs;

/// Exit code for a finished record: success 0, failure 1, error 2.
pub fn exit_code(record: &RunRecord) -> i32 {
    match record.verdict {
        SuiteVerdict::Success => 0,
        SuiteVerdict::Failure => 1,
        SuiteVerdict::Error | SuiteVerdict::Pending => 2,
    }
}

pub async fn handle_suite(args: SuiteArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let body = tokio::fs::read(&args.file).await?;
    let suite = bft_core::api::parse_suite_request(&HashMap::new(), &body)?;

    let services = ctx
        .build_services(&PluginServicesFactory)
        .map_err(CliError::Services)?;
    let orchestrator = ctx.orchestrator(services);

    let run_id = orchestrator.store().allocate();
    tracing::info!(run_id = %run_id, suite = %suite.name, "Running suite from {}", args.file.display());

    let record = orchestrator
        .run_to_completion(run_id.clone(), suite)
        .await
        .ok_or_else(|| CliError::Command(format!("run {run_id} produced no record")))?;

    let rendered = if args.compact {
        serde_json::to_string(record.as_ref())
    } else {
        serde_json::to_string_pretty(record.as_ref())
    }
    .map_err(|e| CliError::Command(format!("could not render record: {e}")))?;
    println!("{rendered}");

    Ok(exit_code(&record))
}
