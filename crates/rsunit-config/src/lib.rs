//! rsunit Configuration System
//!
//! Provides configuration for the `rsunit` plug-in tester:
//! - Project configuration (`rsunit.toml`, found by walking up directories)
//! - Environment variable overrides (`RSUNIT_*`, `NO_COLOR`)
//!
//! # Configuration Hierarchy
//!
//! Later sources override earlier ones:
//! 1. Built-in defaults
//! 2. Project config (`rsunit.toml`)
//! 3. Environment variables
//! 4. Command-line flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use rsunit_config::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::new().load_from_directory(Path::new(".")).unwrap();
//! println!("progress: {}", config.progress());
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{Config, ConfigLoader};
pub use project::{
    OutputConfig, OutputStream, PluginsConfig, ProgressStyle, ProjectConfig, ReportConfig,
    CONFIG_FILE_NAME,
};
