//! Plug-in manager - load, drive and unload test plug-ins

use super::library::LibraryLoader;
use super::{check_declaration, PlugInError, PlugInParameters, PlugInResult, TestPlugIn};
use crate::outputter::XmlOutputter;
use crate::registry::TestRegistry;
use crate::result::TestResult;
use libloading::Library;
use std::path::PathBuf;
use tracing::{debug, info};

/// A loaded plug-in
///
/// Fields drop in declaration order: the interface (whose code lives in the
/// library) goes before the library handle.
struct PlugInInfo {
    file_name: String,
    parameters: PlugInParameters,
    interface: Box<dyn TestPlugIn>,
    library: Option<Library>,
}

/// Owns the loaded plug-ins and forwards host requests to them
///
/// Forwarding methods borrow the manager for as long as the registry, result
/// or outputter holding plug-in contributions lives, so those objects are
/// always dropped before the plug-ins are unloaded. On drop, plug-ins are
/// uninitialized and unloaded in reverse load order.
pub struct PlugInManager {
    loader: LibraryLoader,
    plugins: Vec<PlugInInfo>,
}

impl Default for PlugInManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PlugInManager {
    pub fn new() -> Self {
        Self::with_loader(LibraryLoader::new())
    }

    pub fn with_loader(loader: LibraryLoader) -> Self {
        Self {
            loader,
            plugins: Vec::new(),
        }
    }

    /// Add a directory searched for short plug-in names
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.loader.add_search_path(path);
    }

    /// Load and initialize the plug-in library `file_name`
    ///
    /// On error nothing is recorded and the library, if it was opened, is
    /// closed again.
    pub fn load(&mut self, file_name: &str, parameters: PlugInParameters) -> PlugInResult<()> {
        self.ensure_not_loaded(file_name)?;

        let library = self.loader.open(file_name)?;
        let declaration = unsafe { LibraryLoader::entry_point(&library, file_name)? };
        check_declaration(file_name, declaration)?;

        let interface = (declaration.create)();
        info!(plugin = file_name, parameters = %parameters, "loaded plug-in");
        self.record(file_name, parameters, interface, Some(library));
        Ok(())
    }

    /// Load every `(file_name, parameters)` in order, stopping at the first
    /// failure
    ///
    /// Plug-ins loaded before the failing one stay loaded.
    pub fn load_all<I>(&mut self, plugins: I) -> PlugInResult<()>
    where
        I: IntoIterator<Item = (String, PlugInParameters)>,
    {
        for (file_name, parameters) in plugins {
            self.load(&file_name, parameters)?;
        }
        Ok(())
    }

    /// Manage a plug-in linked into the host under `name`
    pub fn register_builtin(
        &mut self,
        name: &str,
        interface: Box<dyn TestPlugIn>,
        parameters: PlugInParameters,
    ) -> PlugInResult<()> {
        self.ensure_not_loaded(name)?;
        debug!(plugin = name, "registered built-in plug-in");
        self.record(name, parameters, interface, None);
        Ok(())
    }

    /// Uninitialize and unload one plug-in; `false` if it was not loaded
    pub fn unload(&mut self, file_name: &str) -> bool {
        match self.plugins.iter().position(|p| p.file_name == file_name) {
            Some(index) => {
                let plugin = self.plugins.remove(index);
                Self::release(plugin);
                true
            }
            None => false,
        }
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_loaded(&self, file_name: &str) -> bool {
        self.plugins.iter().any(|p| p.file_name == file_name)
    }

    /// Names of the loaded plug-ins, in load order
    pub fn plugin_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.plugins.iter().map(|p| p.file_name.as_str())
    }

    /// Parameters a plug-in was loaded with
    pub fn parameters(&self, file_name: &str) -> Option<&PlugInParameters> {
        self.plugins
            .iter()
            .find(|p| p.file_name == file_name)
            .map(|p| &p.parameters)
    }

    pub fn register_tests<'p>(&'p self, registry: &mut TestRegistry<'p>) {
        for plugin in &self.plugins {
            plugin.interface.register_tests(registry);
        }
    }

    pub fn add_listener<'p>(&'p self, result: &mut TestResult<'p>) {
        for plugin in &self.plugins {
            plugin.interface.add_listener(result);
        }
    }

    pub fn remove_listener(&self, result: &mut TestResult<'_>) {
        for plugin in &self.plugins {
            plugin.interface.remove_listener(result);
        }
    }

    pub fn add_xml_outputter_hooks<'p>(&'p self, outputter: &mut XmlOutputter<'p>) {
        for plugin in &self.plugins {
            plugin.interface.add_xml_outputter_hooks(outputter);
        }
    }

    pub fn remove_xml_outputter_hooks(&self, outputter: &mut XmlOutputter<'_>) {
        for plugin in &self.plugins {
            plugin.interface.remove_xml_outputter_hooks(outputter);
        }
    }

    fn ensure_not_loaded(&self, file_name: &str) -> PlugInResult<()> {
        if self.is_loaded(file_name) {
            return Err(PlugInError::AlreadyLoaded {
                library: file_name.to_string(),
            });
        }
        Ok(())
    }

    fn record(
        &mut self,
        file_name: &str,
        parameters: PlugInParameters,
        mut interface: Box<dyn TestPlugIn>,
        library: Option<Library>,
    ) {
        interface.initialize(&parameters);
        self.plugins.push(PlugInInfo {
            file_name: file_name.to_string(),
            parameters,
            interface,
            library,
        });
    }

    fn release(mut plugin: PlugInInfo) {
        debug!(plugin = %plugin.file_name, "unloading plug-in");
        plugin.interface.uninitialize();
        let PlugInInfo {
            interface, library, ..
        } = plugin;
        drop(interface);
        drop(library);
    }
}

impl Drop for PlugInManager {
    fn drop(&mut self) {
        while let Some(plugin) = self.plugins.pop() {
            Self::release(plugin);
        }
    }
}
