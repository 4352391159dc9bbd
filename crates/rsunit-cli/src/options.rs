//! Run options - command line merged over configuration

use crate::Cli;
use anyhow::{Context, Result};
use rsunit_config::{Config, ConfigLoader, OutputStream, ProgressStyle};
use rsunit_runtime::outputter::DEFAULT_ENCODING;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File extensions of plug-in libraries on the supported platforms
const LIBRARY_EXTENSIONS: [&str; 3] = ["so", "dylib", "dll"];

/// A plug-in named on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlugInSpec {
    pub file_name: String,
    pub parameters: String,
}

/// Positional arguments: plug-ins and the optional test path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub plugins: Vec<PlugInSpec>,
    pub test_path: String,
}

impl Targets {
    /// Split `name[=parameters]` plug-ins from the `:testPath`
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut plugins = Vec::new();
        let mut test_path = None;

        for arg in args {
            if let Some(path) = arg.strip_prefix(':') {
                if test_path.is_some() {
                    return Err(format!(
                        "only one test path can be given, found another: '{}'",
                        arg
                    ));
                }
                test_path = Some(path.to_string());
                continue;
            }

            let (file_name, parameters) = match arg.split_once('=') {
                Some((file_name, parameters)) => (file_name, parameters),
                None => (arg.as_str(), ""),
            };
            if file_name.is_empty() {
                return Err(format!("missing plug-in file name in '{}'", arg));
            }
            plugins.push(PlugInSpec {
                file_name: file_name.to_string(),
                parameters: parameters.to_string(),
            });
        }

        if plugins.is_empty() {
            return Err("at least one test plug-in must be given".to_string());
        }

        Ok(Self {
            plugins,
            test_path: test_path.unwrap_or_default(),
        })
    }
}

/// Where the XML report goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlTarget {
    Stream,
    File(PathBuf),
}

/// Everything a run needs, after precedence is applied
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub plugins: Vec<PlugInSpec>,
    pub test_path: String,
    pub search_paths: Vec<PathBuf>,
    pub progress: ProgressStyle,
    pub stream: OutputStream,
    pub color: bool,
    pub compiler: bool,
    pub text: bool,
    pub xml: Option<XmlTarget>,
    pub stylesheet: Option<String>,
    pub encoding: String,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            loader
                .load_from_directory(&cwd)
                .context("failed to load rsunit.toml")
        }
    }
}

impl RunOptions {
    /// Command-line flags override the configuration
    pub fn merge(cli: &Cli, targets: Targets, config: &Config) -> Self {
        let progress = if cli.brief_progress {
            ProgressStyle::Brief
        } else if cli.no_progress {
            ProgressStyle::None
        } else {
            config.progress()
        };

        let stream = if cli.cout {
            OutputStream::Stdout
        } else {
            config.stream()
        };

        let xml = match cli.xml.as_deref() {
            Some("") => Some(config.xml_file().map_or(XmlTarget::Stream, XmlTarget::File)),
            Some(file) => {
                if looks_like_library(file) {
                    warn!(
                        file,
                        "XML report file looks like a plug-in library; name the report file with --xml=FILE"
                    );
                }
                Some(XmlTarget::File(PathBuf::from(file)))
            }
            None if config.xml_report() => {
                Some(config.xml_file().map_or(XmlTarget::Stream, XmlTarget::File))
            }
            None => None,
        };

        let compiler = cli.compiler || config.compiler_report();
        let mut text = cli.text || config.text_report();
        if !compiler && !text && xml.is_none() {
            text = true;
        }

        let mut search_paths = cli.plugin_paths.clone();
        search_paths.extend(config.plugin_search_paths());

        Self {
            plugins: targets.plugins,
            test_path: targets.test_path,
            search_paths,
            progress,
            stream,
            color: config.color(),
            compiler,
            text,
            xml,
            stylesheet: cli
                .stylesheet
                .clone()
                .or_else(|| config.stylesheet().map(str::to_string)),
            encoding: cli
                .encoding
                .clone()
                .or_else(|| config.encoding().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_ENCODING.to_string()),
        }
    }
}

/// A bare `-x` followed by a plug-in takes the plug-in as the XML file
fn looks_like_library(file: &str) -> bool {
    Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LIBRARY_EXTENSIONS.contains(&ext))
}
