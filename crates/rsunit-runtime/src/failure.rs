//! Failure records and the assertion channel
//!
//! A leaf test signals an assertion failure by unwinding with an
//! [`AssertionFailure`] payload (see [`fail`] and [`check`]). Any other
//! unwind out of a test body is an unexpected fault. Both end up as a
//! [`TestFailure`] delivered to listeners.

use crate::test::{Test, TestId};
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, Location};
use std::sync::Once;

/// Location in a source file where a failure was raised
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLine {
    /// Source file name
    pub file: String,
    /// 1-based line number
    pub line: u32,
}

impl SourceLine {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// The condition thrown by a failing test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    message: String,
    location: Option<SourceLine>,
}

impl Exception {
    /// Create an exception with no source location
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Attach the source location the exception was raised from
    pub fn with_location(mut self, location: SourceLine) -> Self {
        self.location = Some(location);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_line(&self) -> Option<&SourceLine> {
        self.location.as_ref()
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Unwind payload raised by [`fail`]
///
/// `TestResult::protect` recognises this payload and records an assertion
/// failure (`is_error == false`) instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure(pub Exception);

impl AssertionFailure {
    pub fn exception(&self) -> &Exception {
        &self.0
    }

    pub fn into_exception(self) -> Exception {
        self.0
    }
}

/// Fail the current test with `message`
#[track_caller]
pub fn fail(message: impl Into<String>) -> ! {
    let caller = Location::caller();
    let exception =
        Exception::new(message).with_location(SourceLine::new(caller.file(), caller.line()));
    panic::panic_any(AssertionFailure(exception))
}

/// Fail the current test with `message` unless `condition` holds
#[track_caller]
pub fn check(condition: bool, message: impl Into<String>) {
    if !condition {
        fail(message);
    }
}

thread_local! {
    static PROTECTED_CALLS: Cell<usize> = const { Cell::new(0) };
}

/// Run `body` as a protected test call
///
/// Panics raised inside are reported as test failures, so the hook installed
/// by [`silence_test_panics`] keeps quiet about them.
pub(crate) fn protected<R>(body: impl FnOnce() -> R) -> R {
    PROTECTED_CALLS.with(|calls| calls.set(calls.get() + 1));
    let outcome = body();
    PROTECTED_CALLS.with(|calls| calls.set(calls.get() - 1));
    outcome
}

/// Whether the current thread is inside a protected test call
pub(crate) fn in_protected_call() -> bool {
    PROTECTED_CALLS.with(|calls| calls.get() > 0)
}

/// Keep the panic hook quiet for panics that become test failures
///
/// [`AssertionFailure`] unwinds and any panic raised inside
/// `TestResult::protect` are already reported to listeners. Other panics
/// still reach the previously installed hook. Installing more than once has
/// no further effect.
pub fn silence_test_panics() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let is_assertion = info.payload().downcast_ref::<AssertionFailure>().is_some();
            if !is_assertion && !in_protected_call() {
                previous(info);
            }
        }));
    });
}

/// Record of a single failure event
///
/// Built once by the result when a test body unwinds and never mutated
/// afterwards. The failed test's name is kept so the record can outlive the
/// tree; its [`TestId`] is kept to tell same-named tests apart while the
/// tree is alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    failed_test: String,
    failed_test_id: Option<TestId>,
    thrown: Exception,
    is_error: bool,
}

impl TestFailure {
    /// Failure of a test known by name only
    pub fn new(failed_test: impl Into<String>, thrown: Exception, is_error: bool) -> Self {
        Self {
            failed_test: failed_test.into(),
            failed_test_id: None,
            thrown,
            is_error,
        }
    }

    /// Failure of `failed_test`, keeping its identity
    pub fn for_test(failed_test: &dyn Test, thrown: Exception, is_error: bool) -> Self {
        Self {
            failed_test_id: Some(failed_test.id()),
            ..Self::new(failed_test.name(), thrown, is_error)
        }
    }

    /// Classify an unwind payload caught while running `failed_test`
    ///
    /// The payload is consumed here so nothing allocated by the test body
    /// outlives this call.
    pub(crate) fn from_panic(failed_test: &dyn Test, payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<AssertionFailure>() {
            Ok(assertion) => Self::for_test(failed_test, assertion.into_exception(), false),
            Err(payload) => Self::for_test(
                failed_test,
                Exception::new(format!("uncaught panic: {}", panic_message(payload.as_ref()))),
                true,
            ),
        }
    }

    /// Name of the test that failed
    pub fn failed_test_name(&self) -> &str {
        &self.failed_test
    }

    /// Identity of the failed test, unless the failure was built from a name
    pub fn failed_test_id(&self) -> Option<TestId> {
        self.failed_test_id
    }

    pub fn thrown_exception(&self) -> &Exception {
        &self.thrown
    }

    /// `true` for unexpected faults, `false` for assertion failures
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn source_line(&self) -> Option<&SourceLine> {
        self.thrown.source_line()
    }
}

/// Best-effort description of an arbitrary panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
