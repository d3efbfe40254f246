//! `bft serve`

use tokio::sync::broadcast;

use bft_core::api::{AppContext, CliError};
use bft_plugins::services::PluginServicesFactory;

use crate::commands::cli::ServeArgs;
use crate::http::{server, AppState};

pub async fn handle_serve(args: ServeArgs, ctx: &AppContext) -> Result<(), CliError> {
    let services = ctx
        .build_services(&PluginServicesFactory)
        .map_err(CliError::Services)?;
    let orchestrator = ctx.orchestrator(services);

    let mut cfg = ctx.cfg().clone();
    if let Some(host) = args.host {
        cfg.http_server.host = host;
    }
    if let Some(port) = args.port {
        cfg.http_server.port = port;
    }

    let (shutdown_tx, _) = broadcast::channel(1);
    let state = AppState::new(orchestrator, cfg, shutdown_tx);
    let config = server::ServerConfig::from_state(&state);

    tracing::info!(
        "Starting HTTP server on {}:{} (executor: {}, retention: {}s)",
        config.host,
        config.port,
        state.orchestrator.services().executor.name(),
        state.config.suite.results_retention_seconds
    );

    server::start_server(config, state).await?;
    Ok(())
}
