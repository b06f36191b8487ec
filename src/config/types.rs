//! Core configuration types and loading.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::limits::LimitsConfig;
use super::maintenance::MaintenanceConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Bot identity and runtime defaults.
    #[serde(default)]
    pub bot: BotConfig,
    /// Paths of the save file and key lists.
    #[serde(default)]
    pub files: FilesConfig,
    /// Registry limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Background task timing.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    /// Local console operator.
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Bot identity and runtime defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Display name used until a saved profile overrides it (default: "ConfBot").
    #[serde(default = "default_name")]
    pub name: String,
    /// Status message used until a saved profile overrides it.
    #[serde(default = "default_status_message")]
    pub status_message: String,
    /// Room used by `invite` with no room number (default: 0).
    #[serde(default)]
    pub default_room: u32,
    /// Friends offline longer than this many days are removed (default: 365).
    #[serde(default = "default_inactive_days")]
    pub inactive_days: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            status_message: default_status_message(),
            default_room: 0,
            inactive_days: default_inactive_days(),
        }
    }
}

fn default_name() -> String {
    "ConfBot".to_string()
}

fn default_status_message() -> String {
    "Send me the command 'help' for more info".to_string()
}

fn default_inactive_days() -> u64 {
    365
}

/// File locations. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Engine save file (default: "confbot_save").
    #[serde(default = "default_data_file")]
    pub data: PathBuf,
    /// Master key list (default: "masterkeys").
    #[serde(default = "default_masters_file")]
    pub masters: PathBuf,
    /// Blocked key list (default: "blockedkeys").
    #[serde(default = "default_blocked_file")]
    pub blocked: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            data: default_data_file(),
            masters: default_masters_file(),
            blocked: default_blocked_file(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("confbot_save")
}

fn default_masters_file() -> PathBuf {
    PathBuf::from("masterkeys")
}

fn default_blocked_file() -> PathBuf {
    PathBuf::from("blockedkeys")
}

/// Console operator settings.
///
/// Lines typed on stdin are dispatched as private messages from a friend
/// with this key. Put the same key in the master list to run privileged
/// commands from the console.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Hex public key (64 characters) or address (76 characters). A random
    /// key is used when unset.
    #[serde(default)]
    pub operator_key: Option<String>,
    /// Display name of the console friend (default: "console").
    #[serde(default = "default_operator_name")]
    pub operator_name: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            operator_key: None,
            operator_name: default_operator_name(),
        }
    }
}

fn default_operator_name() -> String {
    "console".to_string()
}
