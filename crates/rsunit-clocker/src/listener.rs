//! Listener feeding the timing model

use crate::model::ClockerModel;
use rsunit_runtime::{Test, TestListener};
use std::cell::RefCell;
use std::rc::Rc;

/// Times every test and suite, printing a report when the run ends
pub struct ClockerListener {
    model: Rc<RefCell<ClockerModel>>,
    flat: bool,
    print_report: bool,
}

impl ClockerListener {
    pub fn new(model: Rc<RefCell<ClockerModel>>) -> Self {
        Self {
            model,
            flat: false,
            print_report: true,
        }
    }

    /// List test cases only, without their suites
    pub fn set_flat(&mut self, flat: bool) {
        self.flat = flat;
    }

    pub fn set_print_report(&mut self, print_report: bool) {
        self.print_report = print_report;
    }
}

impl TestListener for ClockerListener {
    fn start_test_run(&mut self, _test: &dyn Test) {
        self.model.borrow_mut().start_run();
    }

    fn start_suite(&mut self, suite: &dyn Test) {
        self.model.borrow_mut().enter(suite.name(), true);
    }

    fn end_suite(&mut self, _suite: &dyn Test) {
        self.model.borrow_mut().leave();
    }

    fn start_test(&mut self, test: &dyn Test) {
        self.model.borrow_mut().enter(test.name(), false);
    }

    fn end_test(&mut self, _test: &dyn Test) {
        self.model.borrow_mut().leave();
    }

    fn end_test_run(&mut self, _test: &dyn Test) {
        let mut model = self.model.borrow_mut();
        model.end_run();
        if self.print_report {
            print!("{}", model.render(self.flat));
        }
    }
}
