//! Command-line interface for the `atb` binary.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Serve TensorBoard scalar, image and audio logs over HTTP.
#[derive(Debug, Parser)]
#[command(
    name = "atb",
    version,
    about,
    after_help = "Examples:\n  atb runs/exp1\n  atb runs/exp1 --host 0.0.0.0 --port 8080\n  atb runs/exp1/events.out.tfevents.1700000000.host --debug"
)]
pub struct Cli {
    /// Event file, or directory searched recursively for one.
    #[arg(value_name = "LOGDIR")]
    pub logdir: PathBuf,

    /// Host to bind to [default: 127.0.0.1].
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on. An explicit port that is taken is an error;
    /// without one, 6006 and the next ten ports are tried.
    #[arg(long)]
    pub port: Option<u16>,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,

    /// Path to a TOML configuration file [default: atb.toml].
    #[arg(long, env = "ATB_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Seconds between event file reloads.
    #[arg(long, value_name = "SECS")]
    pub reload_interval: Option<u64>,
}

impl Cli {
    /// Applies command-line overrides on top of file and environment
    /// configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = Some(port);
        }
        if let Some(secs) = self.reload_interval {
            config.reload.interval_secs = secs;
        }
        if self.debug {
            config.logging.level = "debug".to_string();
        }
    }
}
