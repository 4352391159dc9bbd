use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

mod options;
mod progress;
mod run;

/// Load rsunit test plug-ins and run their tests.
///
/// Every plug-in registers its tests into one registry; the selected test
/// (everything by default) is run and reported.
///
/// EXAMPLES:
///     rsunit libmath_tests.so                      Run every test of a plug-in
///     rsunit -b -c libmath_tests.so libio_tests.so  Brief progress, compiler-style report
///     rsunit libclocker.so="flat" -n libmath_tests.so
///                                                   Pass "flat" to the clocker plug-in
///     rsunit libmath_tests.so :Math/Math.add       Run a single test
///     rsunit --xml=tests.xml libmath_tests.so      Write an XML report to tests.xml
///
/// ENVIRONMENT VARIABLES:
///     RSUNIT_PROGRESS      Progress style: dots, brief or none
///     RSUNIT_OUTPUT        Report stream: stderr or stdout
///     RSUNIT_XML_ENCODING  Encoding declared by the XML report
///     RSUNIT_NO_COLOR      Set to disable colored output (NO_COLOR works too)
///     RSUNIT_LOG           Log filter, e.g. debug or rsunit_runtime=trace
#[derive(Parser, Debug)]
#[command(name = "rsunit")]
#[command(version)]
#[command(arg_required_else_help = true)]
#[command(
    after_help = "Name the XML report file with --xml=FILE: a bare -x takes the next argument, plug-in or not, as the file.\n\nExit status: 0 when every test passed, 1 when a test failed, a plug-in failed to load or the test path did not resolve, 2 on a bad command line."
)]
pub struct Cli {
    /// Write a compiler-style report (file:line: entries)
    #[arg(short = 'c', long)]
    pub compiler: bool,

    /// Write a plain text report (the default when no report is selected)
    #[arg(short = 't', long)]
    pub text: bool,

    /// Write an XML report, to FILE or to the report stream
    ///
    /// Use `--xml=FILE`: a bare `-x` followed by a plug-in name takes the
    /// plug-in name as the file.
    #[arg(short = 'x', long, value_name = "FILE", num_args = 0..=1, default_missing_value = "")]
    pub xml: Option<String>,

    /// XSL stylesheet referenced by the XML report
    #[arg(short = 's', long = "xsl", value_name = "STYLESHEET")]
    pub stylesheet: Option<String>,

    /// Encoding declared by the XML report (UTF-8, ISO-8859-1, ...)
    #[arg(short = 'e', long)]
    pub encoding: Option<String>,

    /// One line per test instead of one dot
    #[arg(short = 'b', long = "brief-progress", conflicts_with = "no_progress")]
    pub brief_progress: bool,

    /// Show no test progress
    #[arg(short = 'n', long = "no-progress")]
    pub no_progress: bool,

    /// Write reports to stdout instead of stderr
    #[arg(short = 'o', long = "cout")]
    pub cout: bool,

    /// Wait for RETURN before exiting
    #[arg(short = 'w', long)]
    pub wait: bool,

    /// Configuration file (default: rsunit.toml in this or a parent directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Additional directory searched for plug-ins
    #[arg(long = "plugin-path", value_name = "DIR")]
    pub plugin_paths: Vec<PathBuf>,

    /// Plug-ins to load (`name[=parameters]`) and at most one `:testPath`
    #[arg(value_name = "PLUGIN[=PARAMS] | :TEST_PATH", required = true)]
    pub targets: Vec<String>,
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RSUNIT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    rsunit_runtime::silence_test_panics();

    let targets = match options::Targets::parse(&cli.targets) {
        Ok(targets) => targets,
        Err(message) => Cli::command().error(ErrorKind::ValueValidation, message).exit(),
    };

    let code = match execute(&cli, targets) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    };

    if cli.wait {
        run::wait_for_return();
    }
    code
}

fn execute(cli: &Cli, targets: options::Targets) -> Result<bool> {
    let config = options::load_config(cli.config.as_deref())?;
    let options = options::RunOptions::merge(cli, targets, &config);
    if !options.color {
        colored::control::set_override(false);
    }
    run::run_tests(&options)
}
