//! Project Configuration (rsunit.toml)
//!
//! Handles project-level runner defaults stored in `rsunit.toml`.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "rsunit.toml";

/// Project configuration from rsunit.toml
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Progress and output stream settings
    pub output: Option<OutputConfig>,

    /// Report outputters
    pub report: Option<ReportConfig>,

    /// Plug-in lookup
    pub plugins: Option<PluginsConfig>,
}

/// `[output]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub progress: Option<ProgressStyle>,

    /// Stream the reports are written to
    pub stream: Option<OutputStream>,

    /// Colored progress and status lines
    pub color: Option<bool>,
}

/// `[report]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub compiler: Option<bool>,

    pub text: Option<bool>,

    pub xml: Option<bool>,

    /// File the XML report goes to (default: the report stream)
    pub xml_file: Option<PathBuf>,

    /// XSL stylesheet referenced by the XML report
    pub stylesheet: Option<String>,

    /// Encoding declared by the XML report
    pub encoding: Option<String>,
}

/// `[plugins]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Directories searched for short plug-in names, relative to the
    /// project root
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

/// How test progress is shown while tests run
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStyle {
    /// One character per test
    #[default]
    Dots,
    /// One line per test with its outcome
    Brief,
    None,
}

impl FromStr for ProgressStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dots" => Ok(ProgressStyle::Dots),
            "brief" => Ok(ProgressStyle::Brief),
            "none" => Ok(ProgressStyle::None),
            other => Err(format!("expected dots, brief or none, got '{}'", other)),
        }
    }
}

impl fmt::Display for ProgressStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgressStyle::Dots => "dots",
            ProgressStyle::Brief => "brief",
            ProgressStyle::None => "none",
        };
        f.write_str(name)
    }
}

/// Standard stream reports are written to
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    #[default]
    Stderr,
    Stdout,
}

impl FromStr for OutputStream {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stderr" => Ok(OutputStream::Stderr),
            "stdout" => Ok(OutputStream::Stdout),
            other => Err(format!("expected stderr or stdout, got '{}'", other)),
        }
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(report) = &self.report {
            if let Some(encoding) = &report.encoding {
                if encoding.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "report.encoding".to_string(),
                        reason: "encoding cannot be empty".to_string(),
                    });
                }
            }

            if let Some(xml_file) = &report.xml_file {
                if xml_file.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "report.xml_file".to_string(),
                        reason: "file name cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub(crate) fn output_mut(&mut self) -> &mut OutputConfig {
        self.output.get_or_insert_with(OutputConfig::default)
    }

    pub(crate) fn report_mut(&mut self) -> &mut ReportConfig {
        self.report.get_or_insert_with(ReportConfig::default)
    }
}
