//! Test plug-ins
//!
//! A plug-in is a dynamic library exporting [`PLUGIN_ENTRY_SYMBOL`]
//! (use [`export_plugin!`](crate::export_plugin)). The entry point returns a
//! [`PlugInDeclaration`] from which the manager creates the plug-in's
//! [`TestPlugIn`] interface.
//!
//! Plug-ins are built with the same compiler and the same `rsunit-runtime`
//! version as the host; both are checked at load time. A `cdylib` plug-in
//! carries its own copy of the runtime: its tests are run and their panics
//! caught by that copy, so assertion unwinds never cross the library
//! boundary.

mod library;
mod manager;
mod parameters;

pub use library::LibraryLoader;
pub use manager::PlugInManager;
pub use parameters::PlugInParameters;

use crate::outputter::XmlOutputter;
use crate::registry::TestRegistry;
use crate::result::TestResult;
use thiserror::Error;

/// Symbol every plug-in library exports
pub const PLUGIN_ENTRY_SYMBOL: &str = "rsunit_plugin_entry";

/// Layout version of [`PlugInDeclaration`] and [`TestPlugIn`]
pub const PLUGIN_ABI_VERSION: u32 = 1;

/// Signature of the exported entry point
pub type PlugInEntry = fn() -> &'static PlugInDeclaration;

/// Static description returned by a plug-in's entry point
pub struct PlugInDeclaration {
    pub abi_version: u32,
    /// `rsunit-runtime` version the plug-in was built against
    pub runtime_version: &'static str,
    pub create: fn() -> Box<dyn TestPlugIn>,
}

/// Interface a plug-in provides to the host
///
/// Contributions borrow the plug-in (`'p`), so the registry, result and
/// outputter holding them cannot outlive the [`PlugInManager`].
pub trait TestPlugIn {
    /// Called once after the library is loaded
    fn initialize(&mut self, _parameters: &PlugInParameters) {}

    /// Add the plug-in's test factories
    fn register_tests<'p>(&'p self, _registry: &mut TestRegistry<'p>) {}

    fn add_listener<'p>(&'p self, _result: &mut TestResult<'p>) {}

    /// Remove whatever [`TestPlugIn::add_listener`] added
    fn remove_listener(&self, _result: &mut TestResult<'_>) {}

    fn add_xml_outputter_hooks<'p>(&'p self, _outputter: &mut XmlOutputter<'p>) {}

    fn remove_xml_outputter_hooks(&self, _outputter: &mut XmlOutputter<'_>) {}

    /// Called once before the library is unloaded
    fn uninitialize(&mut self) {}
}

/// Plug-in loading errors
#[derive(Debug, Error)]
pub enum PlugInError {
    #[error("plug-in library not found: {library}")]
    LibraryNotFound { library: String },

    #[error("failed to load plug-in library {library}: {reason}")]
    LoadFailed { library: String, reason: String },

    #[error("symbol '{symbol}' not found in plug-in library {library}")]
    SymbolNotFound { library: String, symbol: String },

    #[error("incompatible plug-in {library}: {reason}")]
    IncompatibleInterface { library: String, reason: String },

    #[error("plug-in already loaded: {library}")]
    AlreadyLoaded { library: String },
}

impl PlugInError {
    /// Library name the error refers to
    pub fn library(&self) -> &str {
        match self {
            PlugInError::LibraryNotFound { library }
            | PlugInError::LoadFailed { library, .. }
            | PlugInError::SymbolNotFound { library, .. }
            | PlugInError::IncompatibleInterface { library, .. }
            | PlugInError::AlreadyLoaded { library } => library,
        }
    }
}

pub type PlugInResult<T> = Result<T, PlugInError>;

/// Export a plug-in constructor as the library's entry point
///
/// ```ignore
/// struct Timing;
/// impl rsunit_runtime::TestPlugIn for Timing {}
///
/// fn create() -> Box<dyn rsunit_runtime::TestPlugIn> {
///     Box::new(Timing)
/// }
///
/// rsunit_runtime::export_plugin!(create);
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($create:path) => {
        #[no_mangle]
        pub fn rsunit_plugin_entry() -> &'static $crate::plugin::PlugInDeclaration {
            $crate::failure::silence_test_panics();
            static DECLARATION: $crate::plugin::PlugInDeclaration =
                $crate::plugin::PlugInDeclaration {
                    abi_version: $crate::plugin::PLUGIN_ABI_VERSION,
                    runtime_version: $crate::VERSION,
                    create: $create,
                };
            &DECLARATION
        }
    };
}

/// Check a declaration against this runtime
pub(crate) fn check_declaration(library: &str, declaration: &PlugInDeclaration) -> PlugInResult<()> {
    if declaration.abi_version != PLUGIN_ABI_VERSION {
        return Err(PlugInError::IncompatibleInterface {
            library: library.to_string(),
            reason: format!(
                "plug-in ABI version {} (host expects {})",
                declaration.abi_version, PLUGIN_ABI_VERSION
            ),
        });
    }
    if declaration.runtime_version != crate::VERSION {
        return Err(PlugInError::IncompatibleInterface {
            library: library.to_string(),
            reason: format!(
                "built against rsunit-runtime {} (host is {})",
                declaration.runtime_version,
                crate::VERSION
            ),
        });
    }
    Ok(())
}
