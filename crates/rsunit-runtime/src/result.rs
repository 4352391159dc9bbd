//! The run-time hub: listener dispatch and the stop flag

use crate::failure::{self, TestFailure};
use crate::listener::TestListener;
use crate::test::Test;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// A listener shared between its owner and a [`TestResult`]
pub type SharedListener<'l> = Rc<RefCell<dyn TestListener + 'l>>;

/// Cooperative, monotonic stop request
///
/// Clones share the same flag. Once requested, a stop cannot be withdrawn.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Rc<Cell<bool>>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.set(true);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.get()
    }
}

/// Dispatches run events to registered listeners
///
/// Listeners are notified synchronously, in registration order, for every
/// event (end events are not reversed). The result holds no run state other
/// than the stop flag; accumulating outcomes is a listener's job (see
/// [`crate::TestResultCollector`]).
///
/// The lifetime bounds the registered listeners. Listeners added by a
/// plug-in borrow the plug-in manager, so the result cannot outlive it.
#[derive(Default)]
pub struct TestResult<'l> {
    listeners: Vec<SharedListener<'l>>,
    stop: StopToken,
}

impl<'l> TestResult<'l> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            stop: StopToken::new(),
        }
    }

    /// Register a listener; it is notified after every listener added before
    pub fn add_listener(&mut self, listener: SharedListener<'l>) {
        self.listeners.push(listener);
    }

    /// Unregister a listener
    ///
    /// Removing a listener that is not registered does nothing.
    pub fn remove_listener<L>(&mut self, listener: &Rc<RefCell<L>>)
    where
        L: TestListener + ?Sized,
    {
        let target = Rc::as_ptr(listener) as *const ();
        self.listeners
            .retain(|registered| Rc::as_ptr(registered) as *const () != target);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Request that the run stops before the next test starts
    pub fn stop(&self) {
        self.stop.request_stop();
    }

    /// Whether the run should stop (external or listener request)
    pub fn should_stop(&self) -> bool {
        self.stop.is_stop_requested()
    }

    /// A handle listeners can keep to request a stop from inside a callback
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn start_test(&mut self, test: &dyn Test) {
        self.dispatch(|listener| listener.start_test(test));
    }

    pub fn add_failure(&mut self, failure: &TestFailure) {
        self.dispatch(|listener| listener.add_failure(failure));
    }

    pub fn end_test(&mut self, test: &dyn Test) {
        self.dispatch(|listener| listener.end_test(test));
    }

    pub fn start_suite(&mut self, suite: &dyn Test) {
        self.dispatch(|listener| listener.start_suite(suite));
    }

    pub fn end_suite(&mut self, suite: &dyn Test) {
        self.dispatch(|listener| listener.end_suite(suite));
    }

    /// Run `test` as the top-level test of a run
    pub fn run_test(&mut self, test: &dyn Test) {
        self.dispatch(|listener| listener.start_test_run(test));
        test.run(self);
        self.dispatch(|listener| listener.end_test_run(test));
    }

    /// Run `body` on behalf of `test`, reporting any unwind as a failure
    ///
    /// An [`crate::AssertionFailure`] payload is reported as a failure, any
    /// other payload as an error. Returns `true` when the body completed.
    pub fn protect<F>(&mut self, test: &dyn Test, body: F) -> bool
    where
        F: FnOnce(),
    {
        match failure::protected(|| panic::catch_unwind(AssertUnwindSafe(body))) {
            Ok(()) => true,
            Err(payload) => {
                let failure = TestFailure::from_panic(test, payload);
                self.add_failure(&failure);
                false
            }
        }
    }

    fn dispatch(&self, mut notify: impl FnMut(&mut dyn TestListener)) {
        for listener in &self.listeners {
            notify(&mut *listener.borrow_mut());
        }
    }
}
