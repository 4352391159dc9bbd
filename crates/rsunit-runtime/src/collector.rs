//! Listener that accumulates the outcome of a run

use crate::failure::TestFailure;
use crate::listener::TestListener;
use crate::test::Test;

/// Collects run tests and their failures
///
/// Tests are recorded by name when they start; failures are kept in the
/// order they were reported, each linked to the run index of the test that
/// was running when it arrived.
#[derive(Debug, Clone, Default)]
pub struct TestResultCollector {
    tests: Vec<String>,
    failures: Vec<TestFailure>,
    failed_test_indices: Vec<Option<usize>>,
    running: Option<usize>,
    errors: usize,
}

impl TestResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything collected so far
    pub fn reset(&mut self) {
        self.tests.clear();
        self.failures.clear();
        self.failed_test_indices.clear();
        self.running = None;
        self.errors = 0;
    }

    /// Names of the tests that were started, in run order
    pub fn run_tests(&self) -> &[String] {
        &self.tests
    }

    pub fn run_tests_count(&self) -> usize {
        self.tests.len()
    }

    /// Every failure (assertions and errors), in report order
    pub fn failures(&self) -> &[TestFailure] {
        &self.failures
    }

    /// Failures paired with the run index of the test they belong to
    ///
    /// The index is `None` for a failure reported while no test was running.
    pub fn indexed_failures(&self) -> impl Iterator<Item = (Option<usize>, &TestFailure)> + '_ {
        self.failed_test_indices
            .iter()
            .copied()
            .zip(self.failures.iter())
    }

    /// Number of failures and errors
    pub fn test_failures_total(&self) -> usize {
        self.failures.len()
    }

    /// Number of assertion failures
    pub fn test_failures(&self) -> usize {
        self.failures.len() - self.errors
    }

    /// Number of unexpected faults
    pub fn test_errors(&self) -> usize {
        self.errors
    }

    /// Whether the test named `name` reported at least one failure
    pub fn has_failed(&self, name: &str) -> bool {
        self.failures
            .iter()
            .any(|failure| failure.failed_test_name() == name)
    }

    /// `true` when no failure or error was reported
    pub fn was_successful(&self) -> bool {
        self.failures.is_empty()
    }
}

impl TestListener for TestResultCollector {
    fn start_test(&mut self, test: &dyn Test) {
        self.running = Some(self.tests.len());
        self.tests.push(test.name().to_string());
    }

    fn add_failure(&mut self, failure: &TestFailure) {
        if failure.is_error() {
            self.errors += 1;
        }
        self.failures.push(failure.clone());
        self.failed_test_indices.push(self.running);
    }

    fn end_test(&mut self, _test: &dyn Test) {
        self.running = None;
    }
}
