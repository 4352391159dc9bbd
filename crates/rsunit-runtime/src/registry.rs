//! Explicit test registry
//!
//! A registry collects test factories (from the host program and from
//! plug-ins) and builds a fresh suite out of them. It is an ordinary value
//! owned by the runner's caller; there is no process-wide instance.

use crate::suite::TestSuite;
use crate::test::Test;

/// Default name of the suite built by a registry
pub const DEFAULT_REGISTRY_NAME: &str = "All Tests";

/// Creates a test (usually a suite) on demand
pub trait TestFactory {
    fn make_test(&self) -> Box<dyn Test>;
}

impl<F> TestFactory for F
where
    F: Fn() -> Box<dyn Test>,
{
    fn make_test(&self) -> Box<dyn Test> {
        self()
    }
}

/// Named collection of test factories
///
/// The lifetime bounds the factories: factories registered by a plug-in
/// borrow the plug-in manager.
pub struct TestRegistry<'r> {
    name: String,
    factories: Vec<Box<dyn TestFactory + 'r>>,
}

impl Default for TestRegistry<'_> {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_NAME)
    }
}

impl<'r> TestRegistry<'r> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            factories: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a factory; its test is built after earlier factories'
    pub fn register_factory(&mut self, factory: Box<dyn TestFactory + 'r>) {
        self.factories.push(factory);
    }

    /// Register a closure building a test
    pub fn register<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn Test> + 'r,
    {
        self.register_factory(Box::new(factory));
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build a suite named after the registry holding one test per factory
    pub fn make_test(&self) -> TestSuite<'r> {
        let mut suite = TestSuite::new(self.name.clone());
        self.add_test_to_suite(&mut suite);
        suite
    }

    /// Add one freshly built test per factory to `suite`
    pub fn add_test_to_suite(&self, suite: &mut TestSuite<'r>) {
        for factory in &self.factories {
            suite.add_test(factory.make_test());
        }
    }
}
