//! Test runner - resolve a test path and run it

use crate::path::PathResult;
use crate::result::TestResult;
use crate::suite::TestSuite;
use crate::test::Test;
use tracing::{debug, info};

/// Runs a test selected by path out of the tests added to it
///
/// With exactly one test added, that test acts as the search root, so paths
/// are written from its name down (`"All Tests/Math"`). Otherwise the tests
/// are grouped under a suite named `"All Tests"`.
pub struct TestRunner<'t> {
    suite: TestSuite<'t>,
}

impl Default for TestRunner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> TestRunner<'t> {
    /// Create a runner with no tests
    pub fn new() -> Self {
        Self {
            suite: TestSuite::new("All Tests"),
        }
    }

    /// Add a test to run
    pub fn add_test(&mut self, test: Box<dyn Test + 't>) {
        self.suite.add_test(test);
    }

    /// Test that paths are resolved against
    pub fn root(&self) -> &dyn Test {
        match self.suite.tests() {
            [single] => single.as_ref(),
            _ => &self.suite,
        }
    }

    /// Run the test named by `test_path` (everything when empty)
    ///
    /// Path resolution failures are returned before any test runs; test
    /// failures are reported through `result`.
    pub fn run(&self, result: &mut TestResult<'_>, test_path: &str) -> PathResult<()> {
        let path = self.root().resolve_test_path(test_path)?;
        // A resolved path always holds at least its starting test.
        let test = match path.child_test() {
            Some(test) => test,
            None => return Ok(()),
        };

        info!(
            test = test.name(),
            cases = test.count_test_cases(),
            "running tests"
        );
        result.run_test(test);
        debug!(stopped = result.should_stop(), "run finished");
        Ok(())
    }
}
