//! Configuration loading and persistence
//!
//! Bootstrap configuration lives in a TOML file:
//!
//! ```toml
//! database_path = "/var/lib/labelqr/labelqr.db"
//! host = "127.0.0.1"
//! port = 5790
//!
//! [logging]
//! level = "info"
//!
//! [sender]
//! name = "Gallery Nine"
//! address = "42 Harbor Rd"
//! city = "Portland"
//! state = "ME"
//! zip = "04101"
//! ```
//!
//! Config file resolution order:
//! 1. Command-line argument
//! 2. `LABELQR_CONFIG` environment variable
//! 3. `<config dir>/labelqr/labelqr.toml`
//!
//! A missing file is not an error: defaults are used and the sender is left
//! unconfigured until it is set through the settings endpoint.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::records::SenderInfo;
use crate::{Error, Result};

pub const CONFIG_ENV_VAR: &str = "LABELQR_CONFIG";
pub const CONFIG_FILE_NAME: &str = "labelqr.toml";
pub const DATABASE_FILE_NAME: &str = "labelqr.db";
const APP_DIR: &str = "labelqr";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5790;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// SQLite database file; OS data directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Return address printed on every label
    #[serde(default)]
    pub sender: SenderInfo,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            host: default_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
            sender: SenderInfo::default(),
        }
    }
}

impl TomlConfig {
    /// Configured database path, or the OS default
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Pick the config file path (the file itself may not exist)
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR).join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// `<local data dir>/labelqr/labelqr.db`, falling back to the working directory
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join(DATABASE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
}

/// Load configuration, using defaults when the file does not exist
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using defaults (sender not configured)",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    if !config.sender.is_configured() {
        warn!(
            "Sender not fully configured, missing: {}",
            config.sender.missing_fields().join(", ")
        );
    }

    Ok(config)
}

/// Write configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    info!("Wrote configuration to {}", path.display());
    Ok(())
}

/// Replace only the `[sender]` table of the file at `path`
///
/// Everything else is re-read from disk, so command-line and environment
/// overrides applied to the running config never leak into the file.
pub fn write_sender_to_toml(sender: &SenderInfo, path: &Path) -> Result<()> {
    let mut config = load_toml_config(path)?;
    config.sender = sender.clone();
    write_toml_config(&config, path)
}
