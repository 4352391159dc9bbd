//! XML report decoration with test timings

use crate::model::{seconds, ClockerModel};
use rsunit_runtime::{TestFailure, XmlElement, XmlOutputterHook};
use std::cell::RefCell;
use std::rc::Rc;

/// Adds a `Time` element to every test and `TotalElapsedTime` to the
/// statistics
pub struct ClockerXmlHook {
    model: Rc<RefCell<ClockerModel>>,
}

impl ClockerXmlHook {
    pub fn new(model: Rc<RefCell<ClockerModel>>) -> Self {
        Self { model }
    }

    fn add_time(&self, test: &mut XmlElement, name: &str) {
        if let Some(elapsed) = self.model.borrow().test_elapsed(name) {
            test.add_element(XmlElement::with_content("Time", seconds(elapsed)));
        }
    }
}

impl XmlOutputterHook for ClockerXmlHook {
    fn fail_test_added(&self, test: &mut XmlElement, failure: &TestFailure) {
        self.add_time(test, failure.failed_test_name());
    }

    fn successful_test_added(&self, test: &mut XmlElement, test_name: &str) {
        self.add_time(test, test_name);
    }

    fn statistics_added(&self, statistics: &mut XmlElement) {
        let total = self.model.borrow().total();
        statistics.add_element(XmlElement::with_content("TotalElapsedTime", seconds(total)));
    }
}
