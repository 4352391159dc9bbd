//! Clocker - rsunit test plug-in timing tests
//!
//! Load it next to the plug-ins whose tests should be timed:
//!
//! ```text
//! rsunit librsunit_clocker.so="flat" libmath_tests.so
//! ```
//!
//! Parameters:
//! - `flat`: list test cases only instead of the suite tree
//! - `quiet`: no timing report on stdout (XML timings are still added)

pub mod listener;
pub mod model;
pub mod xml_hook;

pub use listener::ClockerListener;
pub use model::{ClockerModel, TestTiming};
pub use xml_hook::ClockerXmlHook;

use rsunit_runtime::{PlugInParameters, TestPlugIn, TestResult, XmlOutputter};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// The plug-in interface handed to the plug-in manager
pub struct ClockerPlugIn {
    model: Rc<RefCell<ClockerModel>>,
    listener: Rc<RefCell<ClockerListener>>,
    hook: Rc<ClockerXmlHook>,
}

impl Default for ClockerPlugIn {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockerPlugIn {
    pub fn new() -> Self {
        let model = Rc::new(RefCell::new(ClockerModel::new()));
        Self {
            listener: Rc::new(RefCell::new(ClockerListener::new(model.clone()))),
            hook: Rc::new(ClockerXmlHook::new(model.clone())),
            model,
        }
    }

    /// Timings of the last run
    pub fn model(&self) -> Rc<RefCell<ClockerModel>> {
        self.model.clone()
    }
}

impl TestPlugIn for ClockerPlugIn {
    fn initialize(&mut self, parameters: &PlugInParameters) {
        let args = parameters.args();
        let mut listener = self.listener.borrow_mut();
        listener.set_flat(args.iter().any(|arg| arg == "flat"));
        listener.set_print_report(!args.iter().any(|arg| arg == "quiet"));
        debug!(parameters = %parameters, "clocker initialized");
    }

    fn add_listener<'p>(&'p self, result: &mut TestResult<'p>) {
        result.add_listener(self.listener.clone());
    }

    fn remove_listener(&self, result: &mut TestResult<'_>) {
        result.remove_listener(&self.listener);
    }

    fn add_xml_outputter_hooks<'p>(&'p self, outputter: &mut XmlOutputter<'p>) {
        outputter.add_hook(self.hook.clone());
    }

    fn remove_xml_outputter_hooks(&self, outputter: &mut XmlOutputter<'_>) {
        outputter.remove_hook(&self.hook);
    }
}

fn create_plugin() -> Box<dyn TestPlugIn> {
    Box::new(ClockerPlugIn::new())
}

rsunit_runtime::export_plugin!(create_plugin);
