//! XML report with plug-in hooks
//!
//! The document layout is:
//!
//! ```text
//! <TestRun>
//!   <FailedTests> <FailedTest id=".."> Name FailureType Location? Message </FailedTest> ...
//!   <SuccessfulTests> <Test id=".."> Name </Test> ...
//!   <Statistics> Tests FailuresTotal Errors Failures
//! </TestRun>
//! ```
//!
//! Hooks registered with [`XmlOutputter::add_hook`] may decorate the
//! document while it is built.

use super::Outputter;
use crate::collector::TestResultCollector;
use crate::failure::TestFailure;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io;
use std::rc::Rc;

/// Encoding declared when none is configured
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// An element of the generated document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    content: String,
    attributes: Vec<(String, String)>,
    elements: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: String::new(),
            attributes: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Element holding a text value
    pub fn with_content(name: impl Into<String>, content: impl ToString) -> Self {
        let mut element = Self::new(name);
        element.content = content.to_string();
        element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl ToString) {
        self.content = content.to_string();
    }

    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl ToString) {
        self.attributes.push((name.into(), value.to_string()));
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn add_element(&mut self, element: XmlElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[XmlElement] {
        &self.elements
    }

    /// First child element called `name`
    pub fn element_for(&self, name: &str) -> Option<&XmlElement> {
        self.elements.iter().find(|element| element.name == name)
    }

    pub fn element_for_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements.iter_mut().find(|element| element.name == name)
    }

    fn write_to(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}<{}", indent, self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape(value));
        }

        if self.elements.is_empty() && self.content.is_empty() {
            out.push_str("/>\n");
        } else if self.elements.is_empty() {
            let _ = writeln!(out, ">{}</{}>", escape(&self.content), self.name);
        } else {
            out.push_str(">\n");
            if !self.content.is_empty() {
                let _ = writeln!(out, "{}  {}", indent, escape(&self.content));
            }
            for element in &self.elements {
                element.write_to(out, depth + 1);
            }
            let _ = writeln!(out, "{}</{}>", indent, self.name);
        }
    }
}

/// Whole document: declaration, optional stylesheet and root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    encoding: String,
    stylesheet: Option<String>,
    root: XmlElement,
}

impl XmlDocument {
    pub fn new(encoding: impl Into<String>, root: XmlElement) -> Self {
        Self {
            encoding: encoding.into(),
            stylesheet: None,
            root,
        }
    }

    pub fn set_stylesheet(&mut self, stylesheet: impl Into<String>) {
        self.stylesheet = Some(stylesheet.into());
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = format!(
            "<?xml version=\"1.0\" encoding=\"{}\" standalone=\"yes\"?>\n",
            escape(&self.encoding)
        );
        if let Some(stylesheet) = &self.stylesheet {
            let _ = writeln!(
                out,
                "<?xml-stylesheet type=\"text/xsl\" href=\"{}\"?>",
                escape(stylesheet)
            );
        }
        self.root.write_to(&mut out, 0);
        out
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Decorates the XML report while it is built
///
/// Every method defaults to doing nothing.
pub trait XmlOutputterHook {
    /// Called once the empty `TestRun` root exists
    fn begin_document(&self, _document: &mut XmlDocument) {}

    /// Called after every section was written
    fn end_document(&self, _document: &mut XmlDocument) {}

    /// Called for each `FailedTest` element before it is attached
    fn fail_test_added(&self, _test: &mut XmlElement, _failure: &TestFailure) {}

    /// Called for each successful `Test` element before it is attached
    fn successful_test_added(&self, _test: &mut XmlElement, _test_name: &str) {}

    /// Called with the `Statistics` element before it is attached
    fn statistics_added(&self, _statistics: &mut XmlElement) {}
}

/// Builds the XML report and lets registered hooks decorate it
///
/// The lifetime bounds the hooks; hooks contributed by a plug-in borrow the
/// plug-in manager.
pub struct XmlOutputter<'h> {
    encoding: String,
    stylesheet: Option<String>,
    hooks: Vec<Rc<dyn XmlOutputterHook + 'h>>,
}

impl Default for XmlOutputter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h> XmlOutputter<'h> {
    pub fn new() -> Self {
        Self::with_encoding(DEFAULT_ENCODING)
    }

    pub fn with_encoding(encoding: impl Into<String>) -> Self {
        Self {
            encoding: encoding.into(),
            stylesheet: None,
            hooks: Vec::new(),
        }
    }

    /// Reference an XSL stylesheet from the report
    pub fn set_stylesheet(&mut self, stylesheet: impl Into<String>) {
        self.stylesheet = Some(stylesheet.into());
    }

    pub fn add_hook(&mut self, hook: Rc<dyn XmlOutputterHook + 'h>) {
        self.hooks.push(hook);
    }

    /// Unregister a hook by identity; unknown hooks are ignored
    pub fn remove_hook<H>(&mut self, hook: &Rc<H>)
    where
        H: XmlOutputterHook + ?Sized,
    {
        let target = Rc::as_ptr(hook) as *const ();
        self.hooks
            .retain(|registered| Rc::as_ptr(registered) as *const () != target);
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Build the report document for `result`
    pub fn document(&self, result: &TestResultCollector) -> XmlDocument {
        let mut document = XmlDocument::new(self.encoding.clone(), XmlElement::new("TestRun"));
        if let Some(stylesheet) = &self.stylesheet {
            document.set_stylesheet(stylesheet.clone());
        }
        for hook in &self.hooks {
            hook.begin_document(&mut document);
        }

        let first_failures = first_failure_by_test(result);
        let mut failed = XmlElement::new("FailedTests");
        let mut successful = XmlElement::new("SuccessfulTests");
        for (index, name) in result.run_tests().iter().enumerate() {
            let id = index + 1;
            match first_failures.get(&index) {
                Some(failure) => failed.add_element(self.failed_test_element(id, failure)),
                None => successful.add_element(self.successful_test_element(id, name)),
            }
        }

        let mut statistics = XmlElement::new("Statistics");
        statistics.add_element(XmlElement::with_content("Tests", result.run_tests_count()));
        statistics.add_element(XmlElement::with_content(
            "FailuresTotal",
            result.test_failures_total(),
        ));
        statistics.add_element(XmlElement::with_content("Errors", result.test_errors()));
        statistics.add_element(XmlElement::with_content("Failures", result.test_failures()));
        for hook in &self.hooks {
            hook.statistics_added(&mut statistics);
        }

        let root = document.root_mut();
        root.add_element(failed);
        root.add_element(successful);
        root.add_element(statistics);

        for hook in &self.hooks {
            hook.end_document(&mut document);
        }
        document
    }

    fn failed_test_element(&self, id: usize, failure: &TestFailure) -> XmlElement {
        let mut element = XmlElement::new("FailedTest");
        element.add_attribute("id", id);
        element.add_element(XmlElement::with_content("Name", failure.failed_test_name()));
        let kind = if failure.is_error() { "Error" } else { "Assertion" };
        element.add_element(XmlElement::with_content("FailureType", kind));
        if let Some(line) = failure.source_line() {
            let mut location = XmlElement::new("Location");
            location.add_element(XmlElement::with_content("File", &line.file));
            location.add_element(XmlElement::with_content("Line", line.line));
            element.add_element(location);
        }
        element.add_element(XmlElement::with_content(
            "Message",
            failure.thrown_exception().message(),
        ));

        for hook in &self.hooks {
            hook.fail_test_added(&mut element, failure);
        }
        element
    }

    fn successful_test_element(&self, id: usize, name: &str) -> XmlElement {
        let mut element = XmlElement::new("Test");
        element.add_attribute("id", id);
        element.add_element(XmlElement::with_content("Name", name));

        for hook in &self.hooks {
            hook.successful_test_added(&mut element, name);
        }
        element
    }
}

/// First reported failure of each failed test, keyed by run index
fn first_failure_by_test(result: &TestResultCollector) -> HashMap<usize, &TestFailure> {
    let mut failures = HashMap::new();
    for (index, failure) in result.indexed_failures() {
        if let Some(index) = index {
            failures.entry(index).or_insert(failure);
        }
    }
    failures
}

impl Outputter for XmlOutputter<'_> {
    fn write(&self, result: &TestResultCollector, out: &mut dyn io::Write) -> io::Result<()> {
        out.write_all(self.document(result).to_xml_string().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::{Exception, SourceLine};
    use crate::listener::TestListener;
    use crate::test::TestCase;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn sample_run() -> TestResultCollector {
        let mut collector = TestResultCollector::new();
        collector.start_test(&TestCase::new("Math.add", || {}));
        collector.start_test(&TestCase::new("Math.div", || {}));
        collector.add_failure(&TestFailure::new(
            "Math.div",
            Exception::new("a < b").with_location(SourceLine::new("math.rs", 9)),
            false,
        ));
        collector
    }

    #[test]
    fn test_document_layout() {
        let mut outputter = XmlOutputter::new();
        outputter.set_stylesheet("report.xsl");

        let mut out = Vec::new();
        outputter.write(&sample_run(), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<?xml-stylesheet type="text/xsl" href="report.xsl"?>
<TestRun>
  <FailedTests>
    <FailedTest id="2">
      <Name>Math.div</Name>
      <FailureType>Assertion</FailureType>
      <Location>
        <File>math.rs</File>
        <Line>9</Line>
      </Location>
      <Message>a &lt; b</Message>
    </FailedTest>
  </FailedTests>
  <SuccessfulTests>
    <Test id="1">
      <Name>Math.add</Name>
    </Test>
  </SuccessfulTests>
  <Statistics>
    <Tests>2</Tests>
    <FailuresTotal>1</FailuresTotal>
    <Errors>0</Errors>
    <Failures>1</Failures>
  </Statistics>
</TestRun>
"#
        );
    }

    #[test]
    fn test_empty_sections_self_close() {
        let document = XmlOutputter::with_encoding("ISO-8859-1").document(&TestResultCollector::new());
        let xml = document.to_xml_string();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"ISO-8859-1\""));
        assert!(xml.contains("  <FailedTests/>\n"));
        assert!(xml.contains("  <SuccessfulTests/>\n"));
    }

    #[test]
    fn test_same_named_tests_reported_separately() {
        use crate::failure::fail;
        use crate::result::TestResult;
        use crate::suite::TestSuite;
        use std::cell::RefCell;

        let mut first = TestSuite::new("A");
        first.add_test(Box::new(TestCase::new("dup", || fail("broken"))));
        let mut second = TestSuite::new("B");
        second.add_test(Box::new(TestCase::new("dup", || {})));
        let mut root = TestSuite::new("All Tests");
        root.add_test(Box::new(first));
        root.add_test(Box::new(second));

        let collector = Rc::new(RefCell::new(TestResultCollector::new()));
        let mut result = TestResult::new();
        result.add_listener(collector.clone());
        result.run_test(&root);

        let document = XmlOutputter::new().document(&collector.borrow());
        let failed = document.root().element_for("FailedTests").unwrap();
        let successful = document.root().element_for("SuccessfulTests").unwrap();
        assert_eq!(failed.elements().len(), 1);
        assert_eq!(failed.elements()[0].attribute("id"), Some("1"));
        assert_eq!(successful.elements().len(), 1);
        assert_eq!(successful.elements()[0].attribute("id"), Some("2"));
    }

    #[derive(Default)]
    struct CountingHook {
        begun: Cell<usize>,
        ended: Cell<usize>,
        failed: Cell<usize>,
        passed: Cell<usize>,
    }

    impl XmlOutputterHook for CountingHook {
        fn begin_document(&self, _document: &mut XmlDocument) {
            self.begun.set(self.begun.get() + 1);
        }
        fn end_document(&self, _document: &mut XmlDocument) {
            self.ended.set(self.ended.get() + 1);
        }
        fn fail_test_added(&self, test: &mut XmlElement, _failure: &TestFailure) {
            self.failed.set(self.failed.get() + 1);
            test.add_element(XmlElement::with_content("Flaky", "no"));
        }
        fn successful_test_added(&self, _test: &mut XmlElement, _test_name: &str) {
            self.passed.set(self.passed.get() + 1);
        }
        fn statistics_added(&self, statistics: &mut XmlElement) {
            statistics.add_element(XmlElement::with_content("Hooked", "yes"));
        }
    }

    #[test]
    fn test_hooks_decorate_document() {
        let hook = Rc::new(CountingHook::default());
        let mut outputter = XmlOutputter::new();
        outputter.add_hook(hook.clone());

        let document = outputter.document(&sample_run());

        assert_eq!(hook.begun.get(), 1);
        assert_eq!(hook.ended.get(), 1);
        assert_eq!(hook.failed.get(), 1);
        assert_eq!(hook.passed.get(), 1);
        let failed = document.root().element_for("FailedTests").unwrap();
        assert_eq!(
            failed.elements()[0].element_for("Flaky").unwrap().content(),
            "no"
        );
        let statistics = document.root().element_for("Statistics").unwrap();
        assert!(statistics.element_for("Hooked").is_some());
    }

    #[test]
    fn test_remove_hook() {
        let hook = Rc::new(CountingHook::default());
        let mut outputter = XmlOutputter::new();
        outputter.add_hook(hook.clone());
        outputter.remove_hook(&hook);
        outputter.remove_hook(&hook);

        assert_eq!(outputter.hook_count(), 0);
        outputter.document(&sample_run());
        assert_eq!(hook.begun.get(), 0);
    }

    #[test]
    fn test_element_attributes_are_escaped() {
        let mut element = XmlElement::new("Test");
        element.add_attribute("name", "a\"b");
        let mut out = String::new();
        element.write_to(&mut out, 0);
        assert_eq!(out, "<Test name=\"a&quot;b\"/>\n");
    }
}
