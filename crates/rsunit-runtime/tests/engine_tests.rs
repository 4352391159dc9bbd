//! End-to-end tests of the execution engine through its public API

use pretty_assertions::assert_eq;
use rsunit_runtime::{
    check, fail, Exception, MockTestListener, PathError, Test, TestCase, TestListener,
    TestResult, TestResultCollector, TestRunner, TestSuite, TestSuiteBuilder,
};
use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;

fn run_collecting(test: &dyn Test) -> TestResultCollector {
    let collector = Rc::new(RefCell::new(TestResultCollector::new()));
    let mut result = TestResult::new();
    result.add_listener(collector.clone());
    result.run_test(test);
    let collected = collector.borrow().clone();
    collected
}

/// `All Tests` -> { `Math` -> { add, div }, `Parser` -> { tokens } }
fn project_tree() -> TestSuite<'static> {
    let mut math = TestSuiteBuilder::new("Math");
    math.add_test_case("add", || check(1 + 1 == 2, "1 + 1 == 2"))
        .add_test_case("div", || fail("division by zero"));

    let mut parser = TestSuiteBuilder::new("Parser");
    parser.add_test_case("tokens", || {});

    let mut root = TestSuite::new("All Tests");
    root.add_test(Box::new(math.take_suite()));
    root.add_test(Box::new(parser.take_suite()));
    root
}

// ============================================================================
// Tree and results
// ============================================================================

#[test]
fn test_whole_tree_run() {
    let tree = project_tree();
    let collector = run_collecting(&tree);

    assert_eq!(tree.count_test_cases(), 3);
    assert_eq!(
        collector.run_tests(),
        ["Math.add", "Math.div", "Parser.tokens"].map(String::from)
    );
    assert_eq!(collector.test_failures(), 1);
    assert_eq!(collector.test_errors(), 0);
    assert!(collector.has_failed("Math.div"));
}

#[test]
fn test_error_does_not_stop_siblings() {
    let mut builder = TestSuiteBuilder::new("Io");
    builder
        .add_test_case("read", || panic!("disk unavailable"))
        .add_test_case("write", || {});
    let suite = builder.take_suite();

    let collector = run_collecting(&suite);

    assert_eq!(collector.run_tests_count(), 2);
    assert_eq!(collector.test_errors(), 1);
    assert_eq!(
        collector.failures()[0].thrown_exception().message(),
        "uncaught panic: disk unavailable"
    );
}

/// Requests a stop after the first failure
struct StopOnFailure(rsunit_runtime::StopToken);

impl TestListener for StopOnFailure {
    fn add_failure(&mut self, _failure: &rsunit_runtime::TestFailure) {
        self.0.request_stop();
    }
}

#[test]
fn test_listener_stop_skips_remaining_tests() {
    let tree = project_tree();
    let collector = Rc::new(RefCell::new(TestResultCollector::new()));
    let mut result = TestResult::new();
    let stopper = Rc::new(RefCell::new(StopOnFailure(result.stop_token())));
    result.add_listener(collector.clone());
    result.add_listener(stopper);

    result.run_test(&tree);

    assert!(result.should_stop());
    assert_eq!(
        collector.borrow().run_tests(),
        ["Math.add", "Math.div"].map(String::from)
    );
}

// ============================================================================
// Path resolution through the runner
// ============================================================================

#[rstest]
#[case("", 3)]
#[case("All Tests", 3)]
#[case("/All Tests/Math", 2)]
#[case("Math", 2)]
#[case("Parser/Parser.tokens", 1)]
#[case("Math.div", 1)]
fn test_runner_paths(#[case] path: &str, #[case] expected_runs: usize) {
    let mut runner = TestRunner::new();
    runner.add_test(Box::new(project_tree()));

    let collector = Rc::new(RefCell::new(TestResultCollector::new()));
    let mut result = TestResult::new();
    result.add_listener(collector.clone());

    runner.run(&mut result, path).unwrap();
    assert_eq!(collector.borrow().run_tests_count(), expected_runs);
}

#[rstest]
#[case("Lexer")]
#[case("Math/Math.mul")]
#[case("/Other/Math")]
#[case("/")]
fn test_runner_rejects_bad_paths(#[case] path: &str) {
    let mut runner = TestRunner::new();
    runner.add_test(Box::new(project_tree()));

    let mut result = TestResult::new();
    let err = runner.run(&mut result, path).unwrap_err();
    assert!(matches!(
        err,
        PathError::NotFound { .. } | PathError::RootMismatch { .. } | PathError::EmptyPath { .. }
    ));
}

// ============================================================================
// Mock listener hosted by the framework itself
// ============================================================================

#[test]
fn test_mock_verifies_a_real_run() {
    let failing = TestCase::new("failing", || fail("expected failure"));
    let mock = Rc::new(RefCell::new(MockTestListener::new("mock")));
    {
        let mut mock = mock.borrow_mut();
        mock.set_expect_start_test(&failing);
        mock.set_expect_end_test(&failing);
        mock.set_expected_add_failure_call(1);
        mock.set_expected_start_suite_call(0);
    }

    let mut result = TestResult::new();
    result.add_listener(mock.clone());
    result.run_test(&failing);

    mock.borrow().verify();
}

#[test]
fn test_mock_violation_is_reported_as_test_failure() {
    // A test case driving a mock that receives one call too many.
    let case = TestCase::new("Mock.overcall", || {
        let mut mock = MockTestListener::new("inner");
        mock.set_expected_add_failure_call(2);
        let failure = rsunit_runtime::TestFailure::new("x", Exception::new("boom"), false);
        mock.add_failure(&failure);
        mock.add_failure(&failure);
        mock.add_failure(&failure);
    });

    let collector = run_collecting(&case);

    assert_eq!(collector.test_failures(), 1);
    assert_eq!(collector.test_errors(), 0);
    assert_eq!(
        collector.failures()[0].thrown_exception().message(),
        "inner: unexpected call"
    );
}

#[test]
fn test_mock_parameter_mismatch_reported_at_call_time() {
    let case = TestCase::new("Mock.bad_is_error", || {
        let expected_test = TestCase::new("target", || {});
        let thrown = Exception::new("boom");
        let mut mock = MockTestListener::new("inner");
        mock.set_expect_failure_with(&expected_test, &thrown, true);

        mock.add_failure(&rsunit_runtime::TestFailure::for_test(
            &expected_test,
            thrown.clone(),
            false,
        ));
        fail("verify was reached");
    });

    let collector = run_collecting(&case);

    assert_eq!(
        collector.failures()[0].thrown_exception().message(),
        "inner: bad isError"
    );
}

#[test]
fn test_mock_under_call_reported_by_verify() {
    let case = TestCase::new("Mock.undercall", || {
        let mut mock = MockTestListener::new("inner");
        mock.set_expected_add_failure_call(2);
        mock.add_failure(&rsunit_runtime::TestFailure::new(
            "x",
            Exception::new("boom"),
            false,
        ));
        mock.verify();
    });

    let collector = run_collecting(&case);

    assert!(collector.failures()[0]
        .thrown_exception()
        .message()
        .starts_with("inner: missing add_failure calls"));
}
