//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::background::DEFAULT_RELOAD_INTERVAL;
use crate::net::PortRequest;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 6006;

/// Config file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "atb.toml";

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Background reload settings.
    #[serde(default)]
    pub reload: ReloadConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host name or address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on. When unset, [`DEFAULT_PORT`] is tried first and
    /// the next free port is used if it is taken.
    #[serde(default)]
    pub port: Option<u16>,
}

/// Timing of the background reload task.
#[derive(Debug, Clone, Deserialize)]
pub struct ReloadConfig {
    /// Seconds between re-reads of the event file.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Seconds to wait for the reload task to exit on shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "atb_events=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_interval_secs() -> u64 {
    DEFAULT_RELOAD_INTERVAL.as_secs()
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
        }
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl ServerConfig {
    /// How the listener port should be chosen.
    pub fn port_request(&self) -> PortRequest {
        match self.port {
            Some(port) => PortRequest::Explicit(port),
            None => PortRequest::Default(DEFAULT_PORT),
        }
    }
}

impl ReloadConfig {
    /// Reload period, never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides.
///
/// Environment variable overrides:
/// - `ATB_HOST` overrides `server.host`
/// - `ATB_PORT` overrides `server.port`
/// - `ATB_RELOAD_INTERVAL_SECS` overrides `reload.interval_secs`
/// - `ATB_LOG_LEVEL` overrides `logging.level`
/// - `ATB_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies `ATB_*` overrides read through `lookup`.
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("ATB_HOST") {
        if !host.trim().is_empty() {
            config.server.host = host;
        }
    }
    if let Some(port) = lookup("ATB_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = Some(parsed);
        }
    }
    if let Some(interval) = lookup("ATB_RELOAD_INTERVAL_SECS") {
        if let Ok(parsed) = interval.parse() {
            config.reload.interval_secs = parsed;
        }
    }
    if let Some(level) = lookup("ATB_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("ATB_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}
