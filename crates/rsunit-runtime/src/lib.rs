//! rsunit Runtime - test composition and execution engine
//!
//! This library provides:
//! - The composite test tree (`Test`, `TestCase`, `TestSuite`) and test paths
//! - The run-time result/listener protocol (`TestResult`, `TestListener`)
//! - Failure collection and report outputters (text, compiler, XML)
//! - Dynamically loaded test plug-ins (`PlugInManager`)
//! - An expectation-based listener double (`MockTestListener`)
//!
//! # Example
//!
//! ```
//! use rsunit_runtime::{check, TestCase, TestResult, TestResultCollector, TestSuite};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut suite = TestSuite::new("Math");
//! suite.add_test(Box::new(TestCase::new("Math.addition", || check(1 + 1 == 2, "1 + 1 == 2"))));
//!
//! let collector = Rc::new(RefCell::new(TestResultCollector::new()));
//! let mut result = TestResult::new();
//! result.add_listener(collector.clone());
//! result.run_test(&suite);
//!
//! assert!(collector.borrow().was_successful());
//! ```

/// rsunit runtime version, checked against plug-ins at load time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod collector;
pub mod failure;
pub mod listener;
pub mod mock;
pub mod outputter;
pub mod path;
pub mod plugin;
pub mod registry;
pub mod result;
pub mod runner;
pub mod suite;

pub use collector::TestResultCollector;
pub use failure::{
    check, fail, silence_test_panics, AssertionFailure, Exception, SourceLine, TestFailure,
};
pub use listener::TestListener;
pub use mock::MockTestListener;
pub use outputter::{
    CompilerOutputter, Outputter, TextOutputter, XmlDocument, XmlElement, XmlOutputter,
    XmlOutputterHook,
};
pub use path::{PathError, PathResult, TestPath};
pub use plugin::{
    PlugInDeclaration, PlugInError, PlugInManager, PlugInParameters, PlugInResult, TestPlugIn,
};
pub use registry::{TestFactory, TestRegistry, DEFAULT_REGISTRY_NAME};
pub use result::{SharedListener, StopToken, TestResult};
pub use runner::TestRunner;
pub use suite::{TestSuite, TestSuiteBuilder};
pub use test::{Test, TestCase, TestId};
