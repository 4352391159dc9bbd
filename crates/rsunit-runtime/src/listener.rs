//! Observer interface for test run events

use crate::failure::TestFailure;
use crate::test::Test;

/// Receives notifications while tests run
///
/// Every method defaults to doing nothing, so implementations only override
/// the events they care about. Test references are only valid for the
/// duration of the call.
pub trait TestListener {
    /// Called when a leaf test is about to run
    fn start_test(&mut self, _test: &dyn Test) {}

    /// Called once per failure (assertion or error) of the running test
    fn add_failure(&mut self, _failure: &TestFailure) {}

    /// Called after a leaf test ran, whether it failed or not
    fn end_test(&mut self, _test: &dyn Test) {}

    /// Called before a suite runs its children
    fn start_suite(&mut self, _suite: &dyn Test) {}

    /// Called after a suite ran its children (including after a stop)
    fn end_suite(&mut self, _suite: &dyn Test) {}

    /// Called once before the top-level test of a run
    fn start_test_run(&mut self, _test: &dyn Test) {}

    /// Called once after the top-level test of a run
    fn end_test_run(&mut self, _test: &dyn Test) {}
}
