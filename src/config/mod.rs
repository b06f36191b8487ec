//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, BotConfig, FilesConfig, ConsoleConfig)
//! - [`limits`]: Registry limits (LimitsConfig)
//! - [`maintenance`]: Background task timing (MaintenanceConfig)

mod limits;
mod maintenance;
mod types;

pub use limits::LimitsConfig;
pub use maintenance::MaintenanceConfig;
pub use types::{BotConfig, Config, ConfigError, ConsoleConfig, FilesConfig};
