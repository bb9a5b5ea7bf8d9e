//! Optional configuration file for the CLI and daemon.
//!
//! Lives at `~/.config/clipring/config.toml` (or wherever
//! `CLIPRING_CONFIG_PATH` points). Every field falls back to a built-in
//! default, so the file is never required.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "clipring";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Socket path override. `CLIPRING_SOCKET` still wins over this.
    pub socket_path: Option<PathBuf>,
    /// Maximum number of history entries to keep.
    pub capacity: Option<usize>,
    /// Clipboard sampling interval in milliseconds.
    pub poll_interval_ms: Option<u64>,
}

/// Get the path to the config file
pub fn get_config_file() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CLIPRING_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .context("Could not determine config directory")
}

/// Load configuration, falling back to defaults when the file is missing
pub fn load_config() -> Result<Config> {
    let config_file = get_config_file()?;

    if !config_file.exists() {
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed to read config file: {}", config_file.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", config_file.display()))
}

/// Resolve the socket path. Precedence: `CLIPRING_SOCKET` environment
/// variable, then the config file, then the per-user default.
pub fn get_socket_path(config: &Config) -> PathBuf {
    let env_set = std::env::var(ipc::SOCKET_ENV).map_or(false, |value| !value.is_empty());
    if !env_set {
        if let Some(path) = &config.daemon.socket_path {
            return path.clone();
        }
    }
    ipc::default_socket_path()
}

/// Translate the file-level settings into a daemon runtime config.
pub fn daemon_config(config: &Config) -> daemon::Config {
    let defaults = daemon::Config::default();
    daemon::Config {
        socket_path: get_socket_path(config),
        capacity: config.daemon.capacity.unwrap_or(defaults.capacity),
        poll_interval: config
            .daemon
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval),
    }
}
