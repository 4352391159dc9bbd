//! Report outputters - render a collected run

mod compiler;
mod text;
mod xml;

pub use compiler::CompilerOutputter;
pub use text::TextOutputter;
pub use xml::{XmlDocument, XmlElement, XmlOutputter, XmlOutputterHook, DEFAULT_ENCODING};

use crate::collector::TestResultCollector;
use std::io;

/// Writes a report of a finished run
pub trait Outputter {
    fn write(&self, result: &TestResultCollector, out: &mut dyn io::Write) -> io::Result<()>;
}

/// `"Run:  N   Failures: F   Errors: E"` summary line
pub(crate) fn statistics_line(result: &TestResultCollector) -> String {
    format!(
        "Run:  {}   Failures: {}   Errors: {}",
        result.run_tests_count(),
        result.test_failures(),
        result.test_errors()
    )
}
