//! Expectation-based listener double
//!
//! `MockTestListener` checks that the engine called it the expected number
//! of times and, optionally, with the expected arguments. Violations are
//! raised through [`fail`], so a mock used inside a test case reports them
//! like any other assertion.

use crate::failure::{fail, Exception, TestFailure};
use crate::listener::TestListener;
use crate::test::{Test, TestId};

/// Count and argument expectation for one notification
#[derive(Debug, Default)]
struct CallExpectation {
    active: bool,
    expected_calls: usize,
    calls: usize,
    /// The test the call must carry
    expected_test: Option<TestId>,
}

impl CallExpectation {
    fn expect_calls(&mut self, count: usize) {
        self.active = true;
        self.expected_calls = count;
    }

    fn expect_test(&mut self, test: &dyn Test) {
        self.expect_calls(1);
        self.expected_test = Some(test.id());
    }

    fn record(&mut self, owner: &str, test: &dyn Test) {
        if self.active {
            self.calls += 1;
            if self.calls > self.expected_calls {
                fail(format!("{owner}: unexpected call"));
            }
        }
        if let Some(expected) = self.expected_test {
            if expected != test.id() {
                fail(format!("{owner}: bad test"));
            }
        }
    }

    fn verify(&self, owner: &str, event: &str) {
        if self.active && self.calls != self.expected_calls {
            fail(format!(
                "{owner}: missing {event} calls (expected {}, got {})",
                self.expected_calls, self.calls
            ));
        }
    }
}

/// The failure `add_failure` must receive
#[derive(Debug)]
struct ExpectedFailure {
    test: TestId,
    thrown: Exception,
    is_error: bool,
}

/// Listener double that verifies the notifications it receives
///
/// Expected tests are matched by identity, not by name: a call carrying
/// another test with the same name is a "bad test". A failure built with
/// [`TestFailure::new`] has no identity and never matches an expected test.
///
/// Configure expectations with the `set_expect*` methods before the run,
/// then call [`MockTestListener::verify`] afterwards. Over-calls and argument
/// mismatches fail at call time; missing calls fail in `verify`.
/// Notifications without an expectation are accepted silently.
#[derive(Debug)]
pub struct MockTestListener {
    name: String,
    start_test: CallExpectation,
    end_test: CallExpectation,
    start_suite: CallExpectation,
    end_suite: CallExpectation,
    add_failure: CallExpectation,
    some_failure: bool,
    expected_failure: Option<ExpectedFailure>,
}

impl MockTestListener {
    /// Create a mock; `name` prefixes every violation message
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_test: CallExpectation::default(),
            end_test: CallExpectation::default(),
            start_suite: CallExpectation::default(),
            end_suite: CallExpectation::default(),
            add_failure: CallExpectation::default(),
            some_failure: false,
            expected_failure: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expect exactly one failure for `failed_test` carrying `thrown`
    pub fn set_expect_failure_with(
        &mut self,
        failed_test: &dyn Test,
        thrown: &Exception,
        is_error: bool,
    ) {
        self.add_failure.expect_calls(1);
        self.expected_failure = Some(ExpectedFailure {
            test: failed_test.id(),
            thrown: thrown.clone(),
            is_error,
        });
    }

    /// Expect `add_failure` never to be called
    pub fn set_expect_no_failure(&mut self) {
        self.add_failure.expect_calls(0);
    }

    /// Expect at least one failure, of any kind
    pub fn set_expect_failure(&mut self) {
        self.some_failure = true;
    }

    pub fn set_expected_add_failure_call(&mut self, count: usize) {
        self.add_failure.expect_calls(count);
    }

    /// Expect a single `start_test` for `test`
    pub fn set_expect_start_test(&mut self, test: &dyn Test) {
        self.start_test.expect_test(test);
    }

    pub fn set_expected_start_test_call(&mut self, count: usize) {
        self.start_test.expect_calls(count);
    }

    /// Expect a single `end_test` for `test`
    pub fn set_expect_end_test(&mut self, test: &dyn Test) {
        self.end_test.expect_test(test);
    }

    pub fn set_expected_end_test_call(&mut self, count: usize) {
        self.end_test.expect_calls(count);
    }

    /// Expect a single `start_suite` for `suite`
    pub fn set_expect_start_suite(&mut self, suite: &dyn Test) {
        self.start_suite.expect_test(suite);
    }

    pub fn set_expected_start_suite_call(&mut self, count: usize) {
        self.start_suite.expect_calls(count);
    }

    /// Expect a single `end_suite` for `suite`
    pub fn set_expect_end_suite(&mut self, suite: &dyn Test) {
        self.end_suite.expect_test(suite);
    }

    pub fn set_expected_end_suite_call(&mut self, count: usize) {
        self.end_suite.expect_calls(count);
    }

    /// Check that every expected call happened
    pub fn verify(&self) {
        self.start_test.verify(&self.name, "start_test");
        self.end_test.verify(&self.name, "end_test");
        self.start_suite.verify(&self.name, "start_suite");
        self.end_suite.verify(&self.name, "end_suite");
        self.add_failure.verify(&self.name, "add_failure");

        if self.some_failure && self.add_failure.calls == 0 {
            fail(format!(
                "{}: there was no call to MockTestListener::add_failure()",
                self.name
            ));
        }
    }
}

impl TestListener for MockTestListener {
    fn start_test(&mut self, test: &dyn Test) {
        self.start_test.record(&self.name, test);
    }

    fn add_failure(&mut self, failure: &TestFailure) {
        let expectation = &mut self.add_failure;
        if expectation.active || self.some_failure {
            expectation.calls += 1;
        }
        if expectation.active && expectation.calls > expectation.expected_calls {
            fail(format!("{}: unexpected call", self.name));
        }

        if let Some(expected) = &self.expected_failure {
            if failure.failed_test_id() != Some(expected.test) {
                fail(format!("{}: bad test", self.name));
            }
            if &expected.thrown != failure.thrown_exception() {
                fail(format!("{}: bad thrownException", self.name));
            }
            if expected.is_error != failure.is_error() {
                fail(format!("{}: bad isError", self.name));
            }
        }
    }

    fn end_test(&mut self, test: &dyn Test) {
        self.end_test.record(&self.name, test);
    }

    fn start_suite(&mut self, suite: &dyn Test) {
        self.start_suite.record(&self.name, suite);
    }

    fn end_suite(&mut self, suite: &dyn Test) {
        self.end_suite.record(&self.name, suite);
    }
}
