//! Plugin loader - Finds plugin candidates and resolves them to factories

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::application::errors::PluginError;
use crate::infrastructure::config::PluginEntries;
use crate::plugins::builtin::BuiltinCatalog;
use crate::plugins::trait_def::{FactoryBox, PluginFactory, PluginFactoryFn, FACTORY_SYMBOL};
use super::manifest::{PluginManifest, MANIFEST_FILE};

/// A directory entry that may hold a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Plugin name the capability handle is bound to
    pub name: String,
    pub path: PathBuf,
}

/// A factory ready to construct a plugin
pub struct LoadedFactory {
    pub factory: Arc<dyn PluginFactory>,
    pub description: Option<String>,
    /// Must outlive everything the factory produces
    pub library: Option<Library>,
}

/// Outcome of resolving one candidate
pub enum Resolution {
    Plugin(LoadedFactory),
    /// Not every entry is a plugin; carries the reason for the load report
    NotAPlugin(String),
}

/// Plugin loader
pub struct PluginLoader {
    catalog: BuiltinCatalog,
    entries: PluginEntries,
}

impl PluginLoader {
    pub fn new(catalog: BuiltinCatalog, entries: PluginEntries) -> Self {
        Self { catalog, entries }
    }

    /// List candidates in `plugin_dir`, sorted by file name.
    ///
    /// A missing directory yields no candidates.
    pub fn candidates(&self, plugin_dir: &Path) -> Result<Vec<Candidate>, PluginError> {
        let mut candidates = Vec::new();

        if !plugin_dir.exists() {
            tracing::warn!("Plugin directory does not exist: {}", plugin_dir.display());
            return Ok(candidates);
        }

        for entry in std::fs::read_dir(plugin_dir)
            .map_err(|e| PluginError::Resolution(format!("Failed to read plugin directory: {}", e)))?
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::debug!("Skipping non UTF-8 entry {}", path.display());
                continue;
            };

            // Skip hidden entries
            if file_name.starts_with('.') {
                continue;
            }

            let name = match self.entries {
                PluginEntries::Directories if path.is_dir() => Some(file_name.to_string()),
                PluginEntries::Files if path.is_file() => library_stem(&path),
                _ => None,
            };

            if let Some(name) = name {
                candidates.push(Candidate { name, path });
            }
        }

        candidates.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(candidates)
    }

    /// Resolve a candidate to a constructible factory
    pub fn resolve(&self, candidate: &Candidate) -> Result<Resolution, PluginError> {
        match self.entries {
            PluginEntries::Directories => self.resolve_directory(&candidate.path),
            PluginEntries::Files => load_library(&candidate.path, None),
        }
    }

    fn resolve_directory(&self, path: &Path) -> Result<Resolution, PluginError> {
        let manifest_path = path.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Ok(Resolution::NotAPlugin(format!("no {}", MANIFEST_FILE)));
        }

        let manifest = PluginManifest::from_file(&manifest_path)?;
        if !manifest.enabled {
            return Ok(Resolution::NotAPlugin("disabled in manifest".to_string()));
        }

        if let Some(kind) = &manifest.builtin {
            let factory = self.catalog.get(kind)
                .ok_or_else(|| PluginError::Resolution(format!("Unknown builtin plugin kind '{}'", kind)))?;
            return Ok(Resolution::Plugin(LoadedFactory {
                factory,
                description: manifest.description,
                library: None,
            }));
        }

        // Default: the platform library name for the directory, e.g. lib<name>.so
        let library_path = match &manifest.library {
            Some(lib) => path.join(lib),
            None => {
                let dir_name = path.file_name().unwrap_or_default();
                path.join(libloading::library_filename(dir_name))
            }
        };

        if !library_path.exists() {
            return Err(PluginError::Resolution(format!("Library not found: {}", library_path.display())));
        }

        load_library(&library_path, manifest.description)
    }
}

/// Plugin name for a library file in the files variant, `None` if the file
/// is not a dynamic library.
fn library_stem(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(std::env::consts::DLL_EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let name = stem.strip_prefix(std::env::consts::DLL_PREFIX).unwrap_or(stem);
    (!name.is_empty()).then(|| name.to_string())
}

fn load_library(path: &Path, description: Option<String>) -> Result<Resolution, PluginError> {
    // Load the library
    let library = unsafe {
        Library::new(path)
            .map_err(|e| PluginError::Resolution(format!("Failed to load library {}: {}", path.display(), e)))?
    };

    let factory = {
        // A library without the factory symbol is not a plugin
        let create: Symbol<PluginFactoryFn> = match unsafe { library.get(FACTORY_SYMBOL) } {
            Ok(symbol) => symbol,
            Err(_) => {
                return Ok(Resolution::NotAPlugin(format!("{} exports no plugin factory", path.display())));
            }
        };
        take_factory(*create)?
    };

    Ok(Resolution::Plugin(LoadedFactory {
        factory: Arc::from(factory),
        description,
        library: Some(library),
    }))
}

/// Call an exported factory constructor and take ownership of its result
fn take_factory(create: PluginFactoryFn) -> Result<FactoryBox, PluginError> {
    let raw = unsafe { create() };
    if raw.is_null() {
        return Err(PluginError::Resolution("Plugin factory returned null".to_string()));
    }
    Ok(*unsafe { Box::from_raw(raw) })
}
