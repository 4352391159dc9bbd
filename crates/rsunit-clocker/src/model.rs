//! Elapsed time of every test and suite of a run

use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Timing of one test or suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTiming {
    pub name: String,
    /// Nesting level, 0 for the top-level test
    pub depth: usize,
    pub is_suite: bool,
    pub elapsed: Duration,
}

/// Timings in the order tests started
#[derive(Debug, Default)]
pub struct ClockerModel {
    timings: Vec<TestTiming>,
    running: Vec<(usize, Instant)>,
    run_started: Option<Instant>,
    total: Duration,
}

impl ClockerModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_run(&mut self) {
        self.timings.clear();
        self.running.clear();
        self.total = Duration::ZERO;
        self.run_started = Some(Instant::now());
    }

    pub fn end_run(&mut self) {
        if let Some(started) = self.run_started.take() {
            self.total = started.elapsed();
        }
    }

    /// Start timing `name`, nested in whatever is currently running
    pub fn enter(&mut self, name: &str, is_suite: bool) {
        let index = self.timings.len();
        self.timings.push(TestTiming {
            name: name.to_string(),
            depth: self.running.len(),
            is_suite,
            elapsed: Duration::ZERO,
        });
        self.running.push((index, Instant::now()));
    }

    /// Stop timing the innermost running test or suite
    pub fn leave(&mut self) {
        if let Some((index, started)) = self.running.pop() {
            self.timings[index].elapsed = started.elapsed();
        }
    }

    pub fn timings(&self) -> &[TestTiming] {
        &self.timings
    }

    /// Elapsed time of the first test case called `name`
    pub fn test_elapsed(&self, name: &str) -> Option<Duration> {
        self.timings
            .iter()
            .find(|timing| !timing.is_suite && timing.name == name)
            .map(|timing| timing.elapsed)
    }

    /// Duration of the whole run (zero until the run ended)
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Human readable timing report
    ///
    /// Flat lists test cases only; otherwise suites are shown with their
    /// tests indented below them.
    pub fn render(&self, flat: bool) -> String {
        let mut out = String::from("Test timings:\n");
        for timing in &self.timings {
            if flat {
                if !timing.is_suite {
                    let _ = writeln!(out, "{}: {}", timing.name, seconds(timing.elapsed));
                }
            } else {
                let _ = writeln!(
                    out,
                    "{}{} ({})",
                    "  ".repeat(timing.depth),
                    timing.name,
                    seconds(timing.elapsed)
                );
            }
        }
        let _ = writeln!(out, "Total: {}", seconds(self.total));
        out
    }
}

/// `0.012s`
pub fn seconds(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ClockerModel {
        let mut model = ClockerModel::new();
        model.start_run();
        model.enter("Math", true);
        model.enter("Math.add", false);
        model.leave();
        model.enter("Math.div", false);
        model.leave();
        model.leave();
        model.end_run();
        model
    }

    #[test]
    fn test_nesting_depths() {
        let model = sample();
        let depths: Vec<_> = model
            .timings()
            .iter()
            .map(|t| (t.name.as_str(), t.depth, t.is_suite))
            .collect();
        assert_eq!(
            depths,
            [("Math", 0, true), ("Math.add", 1, false), ("Math.div", 1, false)]
        );
        assert!(model.test_elapsed("Math.add").is_some());
        assert!(model.test_elapsed("Math").is_none());
    }

    #[test]
    fn test_render_flat_skips_suites() {
        let rendered = sample().render(true);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Math.add: "));
        assert!(lines[2].starts_with("Math.div: "));
        assert!(lines[3].starts_with("Total: "));
    }

    #[test]
    fn test_render_tree_indents_tests() {
        let rendered = sample().render(false);
        let lines: Vec<_> = rendered.lines().collect();
        assert!(lines[1].starts_with("Math ("));
        assert!(lines[2].starts_with("  Math.add ("));
    }

    #[test]
    fn test_seconds_format() {
        assert_eq!(seconds(Duration::from_millis(1500)), "1.500s");
    }
}
