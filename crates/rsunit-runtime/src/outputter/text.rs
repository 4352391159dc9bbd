//! Plain text report

use super::{statistics_line, Outputter};
use crate::collector::TestResultCollector;
use crate::failure::TestFailure;
use std::io;

/// Human readable summary followed by one numbered entry per failure
#[derive(Debug, Default, Clone, Copy)]
pub struct TextOutputter;

impl TextOutputter {
    pub fn new() -> Self {
        Self
    }

    fn write_failure(
        &self,
        out: &mut dyn io::Write,
        index: usize,
        failure: &TestFailure,
    ) -> io::Result<()> {
        let kind = if failure.is_error() { "E" } else { "F" };
        write!(out, "{}) test: {} ({})", index, failure.failed_test_name(), kind)?;
        if let Some(location) = failure.source_line() {
            write!(out, " line: {} {}", location.line, location.file)?;
        }
        writeln!(out)?;
        writeln!(out, "{}", failure.thrown_exception().message())
    }
}

impl Outputter for TextOutputter {
    fn write(&self, result: &TestResultCollector, out: &mut dyn io::Write) -> io::Result<()> {
        if result.was_successful() {
            return writeln!(out, "OK ({})", result.run_tests_count());
        }

        writeln!(out, "!!!FAILURES!!!")?;
        writeln!(out, "Test Results:")?;
        writeln!(out, "{}", statistics_line(result))?;
        for (index, failure) in result.failures().iter().enumerate() {
            writeln!(out)?;
            self.write_failure(out, index + 1, failure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::{Exception, SourceLine};
    use crate::listener::TestListener;
    use crate::test::TestCase;
    use pretty_assertions::assert_eq;

    fn render(collector: &TestResultCollector) -> String {
        let mut out = Vec::new();
        TextOutputter::new().write(collector, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_successful_run() {
        let mut collector = TestResultCollector::new();
        collector.start_test(&TestCase::new("a", || {}));
        collector.start_test(&TestCase::new("b", || {}));

        assert_eq!(render(&collector), "OK (2)\n");
    }

    #[test]
    fn test_failures_are_numbered() {
        let mut collector = TestResultCollector::new();
        collector.start_test(&TestCase::new("Math.div", || {}));
        collector.add_failure(&TestFailure::new(
            "Math.div",
            Exception::new("division by zero").with_location(SourceLine::new("src/math.rs", 12)),
            false,
        ));
        collector.start_test(&TestCase::new("Io.read", || {}));
        collector.add_failure(&TestFailure::new(
            "Io.read",
            Exception::new("uncaught panic: disk gone"),
            true,
        ));

        assert_eq!(
            render(&collector),
            "!!!FAILURES!!!\n\
             Test Results:\n\
             Run:  2   Failures: 1   Errors: 1\n\
             \n\
             1) test: Math.div (F) line: 12 src/math.rs\n\
             division by zero\n\
             \n\
             2) test: Io.read (E)\n\
             uncaught panic: disk gone\n"
        );
    }
}
