//! Configuration Loader
//!
//! Finds `rsunit.toml` and applies environment overrides.

use crate::project::{OutputStream, ProgressStyle, ProjectConfig, CONFIG_FILE_NAME};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Progress style override
pub const ENV_PROGRESS: &str = "RSUNIT_PROGRESS";
/// Report stream override (`stderr` or `stdout`)
pub const ENV_OUTPUT: &str = "RSUNIT_OUTPUT";
/// XML encoding override
pub const ENV_XML_ENCODING: &str = "RSUNIT_XML_ENCODING";
/// Disables colors when set to anything
pub const ENV_NO_COLOR: &str = "RSUNIT_NO_COLOR";

/// Configuration loader
///
/// Precedence, lowest first:
/// 1. Built-in defaults
/// 2. Project config (`rsunit.toml`)
/// 3. Environment variables (`RSUNIT_*`, `NO_COLOR`)
/// 4. CLI flags (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip environment overrides
    ignore_env: bool,
}

/// Loaded configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub project: ProjectConfig,

    /// Directory `rsunit.toml` was found in
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Do not apply environment overrides
    pub fn without_env(mut self) -> Self {
        self.ignore_env = true;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find `rsunit.toml`. Without one, the
    /// defaults (plus environment overrides) are returned.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project) = self.find_project_config(start_dir)?;
        self.finish(project, project_root)
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project = ProjectConfig::load_from_file(config_path)?;
        let project_root = config_path.parent().map(|p| p.to_path_buf());
        self.finish(project, project_root)
    }

    fn finish(&self, project: ProjectConfig, project_root: Option<PathBuf>) -> ConfigResult<Config> {
        let project = if self.ignore_env {
            project
        } else {
            apply_env_overrides(project)?
        };

        Ok(Config {
            project,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let project = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }
}

/// Apply environment variable overrides to project config
fn apply_env_overrides(mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
    if let Ok(progress) = env::var(ENV_PROGRESS) {
        config.output_mut().progress = Some(parse_env(ENV_PROGRESS, &progress)?);
    }

    if let Ok(stream) = env::var(ENV_OUTPUT) {
        config.output_mut().stream = Some(parse_env::<OutputStream>(ENV_OUTPUT, &stream)?);
    }

    if let Ok(encoding) = env::var(ENV_XML_ENCODING) {
        config.report_mut().encoding = Some(encoding);
    }

    if env::var_os(ENV_NO_COLOR).is_some() || env::var_os("NO_COLOR").is_some() {
        config.output_mut().color = Some(false);
    }

    config.validate()?;
    Ok(config)
}

fn parse_env<T>(variable: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(|reason| ConfigError::InvalidValue {
        field: variable.to_string(),
        reason,
    })
}

impl Config {
    pub fn progress(&self) -> ProgressStyle {
        self.project
            .output
            .as_ref()
            .and_then(|output| output.progress)
            .unwrap_or_default()
    }

    pub fn stream(&self) -> OutputStream {
        self.project
            .output
            .as_ref()
            .and_then(|output| output.stream)
            .unwrap_or_default()
    }

    pub fn color(&self) -> bool {
        self.project
            .output
            .as_ref()
            .and_then(|output| output.color)
            .unwrap_or(true)
    }

    pub fn compiler_report(&self) -> bool {
        self.report_flag(|report| report.compiler)
    }

    pub fn text_report(&self) -> bool {
        self.report_flag(|report| report.text)
    }

    pub fn xml_report(&self) -> bool {
        self.report_flag(|report| report.xml)
    }

    /// XML report file, resolved against the project root
    pub fn xml_file(&self) -> Option<PathBuf> {
        let file = self.project.report.as_ref()?.xml_file.as_ref()?;
        Some(self.resolve(file))
    }

    pub fn stylesheet(&self) -> Option<&str> {
        self.project.report.as_ref()?.stylesheet.as_deref()
    }

    pub fn encoding(&self) -> Option<&str> {
        self.project.report.as_ref()?.encoding.as_deref()
    }

    /// Plug-in search paths, resolved against the project root
    pub fn plugin_search_paths(&self) -> Vec<PathBuf> {
        self.project
            .plugins
            .iter()
            .flat_map(|plugins| plugins.search_paths.iter())
            .map(|path| self.resolve(path))
            .collect()
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if an `rsunit.toml` was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    fn report_flag(&self, flag: impl Fn(&crate::ReportConfig) -> Option<bool>) -> bool {
        self.project
            .report
            .as_ref()
            .and_then(flag)
            .unwrap_or(false)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.project_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
