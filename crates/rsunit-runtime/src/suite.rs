//! Composite test suites

use crate::result::TestResult;
use crate::test::{Test, TestCase};
use std::fmt;

/// A named, ordered collection of tests run as a unit
///
/// The suite exclusively owns its children; dropping the suite drops every
/// descendant. Children run in insertion order.
///
/// The lifetime bounds the children: tests contributed by a plug-in borrow
/// the plug-in manager, so the tree cannot outlive the loaded library.
pub struct TestSuite<'t> {
    name: String,
    tests: Vec<Box<dyn Test + 't>>,
}

impl<'t> TestSuite<'t> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    /// Append a test; it runs after every test already added
    pub fn add_test(&mut self, test: Box<dyn Test + 't>) {
        self.tests.push(test);
    }

    /// Drop every child test
    pub fn delete_contents(&mut self) {
        self.tests.clear();
    }

    pub fn tests(&self) -> &[Box<dyn Test + 't>] {
        &self.tests
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl fmt::Display for TestSuite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "suite {}", self.name)
    }
}

impl fmt::Debug for TestSuite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSuite")
            .field("name", &self.name)
            .field("tests", &self.tests.len())
            .finish()
    }
}

impl Test for TestSuite<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn count_test_cases(&self) -> usize {
        self.tests.iter().map(|test| test.count_test_cases()).sum()
    }

    fn run(&self, result: &mut TestResult<'_>) {
        result.start_suite(self);
        for test in &self.tests {
            if result.should_stop() {
                break;
            }
            test.run(result);
        }
        result.end_suite(self);
    }

    fn child_test_count(&self) -> usize {
        self.tests.len()
    }

    fn child_test_at(&self, index: usize) -> Option<&dyn Test> {
        self.tests.get(index).map(|test| test.as_ref() as &dyn Test)
    }
}

/// Incrementally builds a suite of named test cases
///
/// Cases added with [`add_test_case`](Self::add_test_case) are named
/// `"<suite>.<case>"`.
pub struct TestSuiteBuilder<'t> {
    suite: TestSuite<'t>,
}

impl<'t> TestSuiteBuilder<'t> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            suite: TestSuite::new(name),
        }
    }

    /// Continue building an existing suite
    pub fn from_suite(suite: TestSuite<'t>) -> Self {
        Self { suite }
    }

    pub fn suite(&self) -> &TestSuite<'t> {
        &self.suite
    }

    pub fn add_test(&mut self, test: Box<dyn Test + 't>) -> &mut Self {
        self.suite.add_test(test);
        self
    }

    pub fn add_test_case(&mut self, name: &str, body: impl Fn() + 'static) -> &mut Self {
        let full_name = format!("{}.{}", self.suite.name(), name);
        self.add_test(Box::new(TestCase::new(full_name, body)))
    }

    pub fn take_suite(self) -> TestSuite<'t> {
        self.suite
    }
}
