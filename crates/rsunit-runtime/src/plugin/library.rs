//! Plug-in library resolution and loading
//!
//! Handles platform-specific library naming conventions and search paths,
//! using `libloading` for the actual open and symbol lookup.

use super::{PlugInDeclaration, PlugInEntry, PlugInError, PlugInResult, PLUGIN_ENTRY_SYMBOL};
use libloading::Library;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locates and opens plug-in libraries
///
/// A plug-in name is resolved, in order, as:
/// - an existing file path (`target/debug/libclocker.so`)
/// - a short name in one of the search paths, with the platform's prefix and
///   extension (`clocker` -> `libclocker.so`)
/// - a name handed to the system loader as is (`LD_LIBRARY_PATH`, ...)
///
/// # Safety
///
/// Opening a library runs its initialization code inside this process. Only
/// load trusted plug-ins.
#[derive(Debug, Clone)]
pub struct LibraryLoader {
    search_paths: Vec<PathBuf>,
}

impl LibraryLoader {
    /// Create a loader searching the current working directory
    pub fn new() -> Self {
        Self {
            search_paths: Self::default_search_paths(),
        }
    }

    fn default_search_paths() -> Vec<PathBuf> {
        std::env::current_dir().into_iter().collect()
    }

    /// Add a search path, searched before the ones added earlier
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.insert(0, path.into());
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// File names a short plug-in name may have on this platform
    fn candidate_file_names(name: &str) -> Vec<String> {
        let extensions: &[&str] = if cfg!(target_os = "windows") {
            &["dll"]
        } else if cfg!(target_os = "macos") {
            &["dylib", "so"]
        } else {
            &["so"]
        };

        let prefixes: &[&str] = if cfg!(target_os = "windows") {
            &["", "lib"]
        } else {
            &["lib", ""]
        };

        let mut names = vec![name.to_string()];
        for prefix in prefixes {
            for ext in extensions {
                names.push(format!("{}{}.{}", prefix, name, ext));
            }
        }
        names
    }

    /// Find the file a plug-in name refers to, if it is on disk
    pub fn resolve_library_path(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        if path.components().count() > 1 {
            return None;
        }

        let candidates = Self::candidate_file_names(name);
        self.search_paths.iter().find_map(|search_path| {
            candidates
                .iter()
                .map(|file_name| search_path.join(file_name))
                .find(|full_path| full_path.is_file())
        })
    }

    /// Open the library a plug-in name refers to
    pub fn open(&self, name: &str) -> PlugInResult<Library> {
        match self.resolve_library_path(name) {
            Some(path) => {
                debug!(library = name, path = %path.display(), "opening plug-in library");
                unsafe { Library::new(&path) }.map_err(|e| PlugInError::LoadFailed {
                    library: name.to_string(),
                    reason: e.to_string(),
                })
            }
            None if Path::new(name).components().count() > 1 => {
                Err(PlugInError::LibraryNotFound {
                    library: name.to_string(),
                })
            }
            None => {
                debug!(library = name, "falling back to the system loader");
                unsafe { Library::new(name) }.map_err(|e| {
                    debug!(library = name, error = %e, "system loader failed");
                    PlugInError::LibraryNotFound {
                        library: name.to_string(),
                    }
                })
            }
        }
    }

    /// Resolve the plug-in entry point of an opened library
    ///
    /// # Safety
    ///
    /// The library must export [`PLUGIN_ENTRY_SYMBOL`] with the
    /// [`PlugInEntry`] signature, i.e. through `export_plugin!` built against
    /// this runtime. The returned declaration must not be used after
    /// `library` is closed.
    pub unsafe fn entry_point(
        library: &Library,
        name: &str,
    ) -> PlugInResult<&'static PlugInDeclaration> {
        let entry = library
            .get::<PlugInEntry>(PLUGIN_ENTRY_SYMBOL.as_bytes())
            .map_err(|_| PlugInError::SymbolNotFound {
                library: name.to_string(),
                symbol: PLUGIN_ENTRY_SYMBOL.to_string(),
            })?;
        Ok(entry())
    }
}

impl Default for LibraryLoader {
    fn default() -> Self {
        Self::new()
    }
}
