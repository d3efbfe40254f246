use clap::Parser;
mod commands;
mod http;
mod logging;
use bft_core::api::{AppContext, CliError};
use bft_core::config;
use commands::cli;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let mut args = cli::Args::parse();

    let cfg = match args.config.as_deref() {
        Some(path) => config::load(Some(path))?,
        None => config::load_default()?,
    };
    let log_guard = logging::init(&cfg.logging);
    let ctx = AppContext::new(cfg);

    let cmd = args
        .command
        .take()
        .unwrap_or_else(|| cli::Commands::Serve(cli::ServeArgs::default()));

    match cmd {
        cli::Commands::Serve(serve_args) => {
            commands::serve::handle_serve(serve_args, &ctx).await?;
        }
        cli::Commands::Suite(suite_args) => {
            let exit = commands::suite::handle_suite(suite_args, &ctx).await?;
            drop(log_guard);
            std::process::exit(exit);
        }
    }
    Ok(())
}
