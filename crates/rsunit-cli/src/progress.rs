//! Progress listeners printed while tests run

use colored::*;
use rsunit_runtime::{Test, TestFailure, TestListener};
use std::io::{self, Write};

/// One character per test: `.` when it starts, `F` or `E` per failure
pub struct DotsProgress<W: Write> {
    out: W,
}

impl DotsProgress<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> DotsProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn emit(&mut self, mark: ColoredString) {
        let _ = write!(self.out, "{}", mark);
        let _ = self.out.flush();
    }
}

impl<W: Write> TestListener for DotsProgress<W> {
    fn start_test(&mut self, _test: &dyn Test) {
        self.emit(".".green());
    }

    fn add_failure(&mut self, failure: &TestFailure) {
        let mark = if failure.is_error() {
            "E".red().bold()
        } else {
            "F".red().bold()
        };
        self.emit(mark);
    }

    fn end_test_run(&mut self, _test: &dyn Test) {
        let _ = writeln!(self.out);
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

/// One line per test: its name followed by its outcome
pub struct BriefProgress<W: Write> {
    out: W,
    failed: bool,
}

impl BriefProgress<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> BriefProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }
}

impl<W: Write> TestListener for BriefProgress<W> {
    fn start_test(&mut self, test: &dyn Test) {
        let _ = write!(self.out, "{}", test.name());
        let _ = self.out.flush();
        self.failed = false;
    }

    fn add_failure(&mut self, failure: &TestFailure) {
        let kind = if failure.is_error() { "error" } else { "assertion" };
        let _ = write!(self.out, " : {}", kind.red().bold());
        self.failed = true;
    }

    fn end_test(&mut self, _test: &dyn Test) {
        if !self.failed {
            let _ = write!(self.out, " : {}", "OK".green());
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}
