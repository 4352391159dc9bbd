//! Plug-in tester run: load plug-ins, run the selected test, write reports

use crate::options::{RunOptions, XmlTarget};
use crate::progress::{BriefProgress, DotsProgress};
use anyhow::{Context, Result};
use colored::*;
use rsunit_config::{OutputStream, ProgressStyle};
use rsunit_runtime::{
    CompilerOutputter, Outputter, PlugInManager, PlugInParameters, TestRegistry, TestResult,
    TestResultCollector, TestRunner, TextOutputter, XmlOutputter,
};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::rc::Rc;
use tracing::{debug, info};

/// Run the selected tests; `Ok(false)` when a test failed, a plug-in did not
/// load or the test path did not resolve
pub fn run_tests(options: &RunOptions) -> Result<bool> {
    let mut manager = PlugInManager::new();
    // Search paths are prepended, so add the preferred ones last.
    for path in options.search_paths.iter().rev() {
        manager.add_search_path(path);
    }

    let plugins = options.plugins.iter().map(|plugin| {
        (
            plugin.file_name.clone(),
            PlugInParameters::new(plugin.parameters.clone()),
        )
    });
    if let Err(err) = manager.load_all(plugins) {
        eprintln!("{}", "Failed to load test plug-in:".red().bold());
        eprintln!("{}", err);
        return Ok(false);
    }
    info!(plugins = manager.plugin_count(), "plug-ins loaded");

    // Everything below borrows the manager and is dropped before it.
    let collector = Rc::new(RefCell::new(TestResultCollector::new()));
    let mut result = TestResult::new();
    result.add_listener(collector.clone());
    match options.progress {
        ProgressStyle::Dots => result.add_listener(Rc::new(RefCell::new(DotsProgress::stdout()))),
        ProgressStyle::Brief => {
            result.add_listener(Rc::new(RefCell::new(BriefProgress::stdout())))
        }
        ProgressStyle::None => {}
    }
    manager.add_listener(&mut result);

    let mut registry = TestRegistry::default();
    manager.register_tests(&mut registry);
    let mut runner = TestRunner::new();
    runner.add_test(Box::new(registry.make_test()));

    let was_successful = match runner.run(&mut result, &options.test_path) {
        Ok(()) => collector.borrow().was_successful(),
        Err(err) => {
            debug!(error = %err, "test path resolution failed");
            eprintln!(
                "{} {}",
                "Failed to resolve test path:".red().bold(),
                options.test_path
            );
            false
        }
    };

    manager.remove_listener(&mut result);

    let collected = collector.borrow();
    write_reports(options, &manager, &collected)?;
    Ok(was_successful)
}

fn write_reports(
    options: &RunOptions,
    manager: &PlugInManager,
    collected: &TestResultCollector,
) -> Result<()> {
    let mut stream = report_stream(options.stream);

    if options.compiler {
        CompilerOutputter::new()
            .write(collected, &mut stream)
            .context("failed to write compiler report")?;
    }

    if options.text {
        TextOutputter::new()
            .write(collected, &mut stream)
            .context("failed to write text report")?;
    }

    if let Some(target) = &options.xml {
        let mut xml = XmlOutputter::with_encoding(options.encoding.clone());
        if let Some(stylesheet) = &options.stylesheet {
            xml.set_stylesheet(stylesheet.clone());
        }
        manager.add_xml_outputter_hooks(&mut xml);
        match target {
            XmlTarget::Stream => xml
                .write(collected, &mut stream)
                .context("failed to write XML report")?,
            XmlTarget::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                let mut file = BufWriter::new(file);
                xml.write(collected, &mut file)
                    .and_then(|()| file.flush())
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }
        manager.remove_xml_outputter_hooks(&mut xml);
    }

    stream.flush().context("failed to flush report stream")?;
    Ok(())
}

fn report_stream(stream: OutputStream) -> Box<dyn Write> {
    match stream {
        OutputStream::Stdout => Box::new(io::stdout()),
        OutputStream::Stderr => Box::new(io::stderr()),
    }
}

/// Block until the user presses RETURN
pub fn wait_for_return() {
    println!("Please press <RETURN> to exit");
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
