use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Bot functional test runner")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (TOML). Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Overrides `http_server.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Overrides `http_server.port`. 0 picks a free port.
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SuiteArgs {
    /// Suite definition, in the same JSON form `POST /suite` accepts.
    #[arg(long)]
    pub file: PathBuf,

    /// Print the record on one line.
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP service (default).
    Serve(ServeArgs),
    /// Run one suite in-process and print its record.
    Suite(SuiteArgs),
}
