//! `atb` binary: serves an event log over HTTP.
//!
//! Starts an axum HTTP server with structured logging, a background
//! reload task, and graceful shutdown on SIGTERM/SIGINT.

use atb_server::cli::Cli;
use atb_server::config::{self, Config, DEFAULT_CONFIG_FILE};
use atb_server::StartupError;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Loads configuration, sets up logging and runs the server.
async fn start(cli: Cli) -> Result<(), StartupError> {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    let mut config = config::load_config(Some(&config_path))?;
    cli.apply(&mut config);

    init_tracing(&config);
    tracing::debug!(path = %config_path, ?config, "resolved configuration");

    atb_server::serve::run(cli.logdir, config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    match start(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
