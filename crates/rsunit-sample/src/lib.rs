//! Sample test plug-in
//!
//! Registers one suite, `Sample`, holding three test cases:
//!
//! - `Sample.ok` passes
//! - `Sample.bad` fails an assertion
//! - `Sample.boom` panics, which is reported as an error
//!
//! ```text
//! rsunit librsunit_sample.so :Sample/Sample.ok
//! ```

use rsunit_runtime::{check, Test, TestPlugIn, TestRegistry, TestSuiteBuilder};
use tracing::debug;

/// Name of the registered suite
pub const SUITE_NAME: &str = "Sample";

/// Build the `Sample` suite
pub fn sample_suite() -> Box<dyn Test> {
    let mut suite = TestSuiteBuilder::new(SUITE_NAME);
    suite
        .add_test_case("ok", || {
            let words: Vec<&str> = "a b c".split(' ').collect();
            check(words.len() == 3, "three words");
        })
        .add_test_case("bad", || {
            let words: Vec<&str> = "a b c".split(',').collect();
            check(words.len() == 3, "three comma separated words");
        })
        .add_test_case("boom", || panic!("sample plug-in error"));
    Box::new(suite.take_suite())
}

#[derive(Debug, Default)]
pub struct SamplePlugIn;

impl TestPlugIn for SamplePlugIn {
    fn register_tests<'p>(&'p self, registry: &mut TestRegistry<'p>) {
        debug!(suite = SUITE_NAME, "registering sample tests");
        registry.register(sample_suite);
    }
}

fn create_plugin() -> Box<dyn TestPlugIn> {
    Box::new(SamplePlugIn)
}

rsunit_runtime::export_plugin!(create_plugin);

#[cfg(test)]
mod tests {
    use super::*;
    use rsunit_runtime::{TestResult, TestResultCollector};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_registered_suite_outcomes() {
        let plugin = SamplePlugIn;
        let mut registry = TestRegistry::default();
        plugin.register_tests(&mut registry);
        assert_eq!(registry.len(), 1);

        let suite = registry.make_test();
        let collector = Rc::new(RefCell::new(TestResultCollector::new()));
        let mut result = TestResult::new();
        result.add_listener(collector.clone());
        result.run_test(&suite);

        let collector = collector.borrow();
        assert_eq!(
            collector.run_tests(),
            ["Sample.ok", "Sample.bad", "Sample.boom"].map(String::from)
        );
        assert_eq!(collector.test_failures(), 1);
        assert_eq!(collector.test_errors(), 1);
    }
}
