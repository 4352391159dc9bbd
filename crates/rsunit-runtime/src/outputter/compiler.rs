//! Compiler-style report, one `file:line:` entry per failure
//!
//! Editors and IDEs that understand compiler diagnostics can jump straight
//! to the failing assertion.

use super::{statistics_line, Outputter};
use crate::collector::TestResultCollector;
use crate::failure::TestFailure;
use std::io;

/// Placeholder written when a failure carries no source location
const UNKNOWN_LOCATION: &str = "##Failure Location unknown##";

#[derive(Debug, Default, Clone, Copy)]
pub struct CompilerOutputter;

impl CompilerOutputter {
    pub fn new() -> Self {
        Self
    }

    fn write_failure(&self, out: &mut dyn io::Write, failure: &TestFailure) -> io::Result<()> {
        match failure.source_line() {
            Some(location) => write!(out, "{}:{}:", location.file, location.line)?,
            None => write!(out, "{}:", UNKNOWN_LOCATION)?,
        }
        let kind = if failure.is_error() { "Error" } else { "Assertion" };
        writeln!(out, " {}", kind)?;
        writeln!(out, "Test name: {}", failure.failed_test_name())?;
        for line in failure.thrown_exception().message().lines() {
            writeln!(out, "- {}", line)?;
        }
        Ok(())
    }
}

impl Outputter for CompilerOutputter {
    fn write(&self, result: &TestResultCollector, out: &mut dyn io::Write) -> io::Result<()> {
        if result.was_successful() {
            return writeln!(out, "OK ({})", result.run_tests_count());
        }

        writeln!(out, "!!!FAILURES!!!")?;
        writeln!(out, "Test Results:")?;
        writeln!(out, "{}", statistics_line(result))?;
        for failure in result.failures() {
            writeln!(out)?;
            self.write_failure(out, failure)?;
        }
        Ok(())
    }
}
