//! Plugin manager - discovers plugins and tracks load success per plugin

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::errors::{panic_message, PluginError};
use crate::infrastructure::config::PluginEntries;
use crate::infrastructure::plugins::{Candidate, LoadedFactory, PluginInfo, PluginLoader, PluginRegistry, Resolution};
use crate::plugins::builtin::BuiltinCatalog;
use crate::plugins::register::Register;

/// What happened to each candidate during `load_all`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Plugins now active, in load order
    pub loaded: Vec<String>,
    /// Entries that are not plugins, with the reason
    pub skipped: Vec<(String, String)>,
    /// Plugins that failed to resolve or construct, with the error
    pub failed: Vec<(String, String)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loaded, {} skipped, {} failed",
            self.loaded.len(),
            self.skipped.len(),
            self.failed.len()
        )?;
        if !self.loaded.is_empty() {
            write!(f, " [{}]", self.loaded.join(", "))?;
        }
        Ok(())
    }
}

/// Manages all plugins for the bot
pub struct PluginManager {
    registry: Arc<PluginRegistry>,
    catalog: BuiltinCatalog,
}

impl PluginManager {
    /// Create a new plugin manager resolving builtins from `catalog`
    pub fn new(catalog: BuiltinCatalog) -> Self {
        Self {
            registry: Arc::new(PluginRegistry::new()),
            catalog,
        }
    }

    /// Load every plugin found in `plugin_dir`.
    ///
    /// One plugin failing never stops the others; it is logged, reported and
    /// left out of the active set. Only an unreadable directory is an error.
    pub fn load_all(&self, plugin_dir: &Path, entries: PluginEntries) -> Result<LoadReport, PluginError> {
        let loader = PluginLoader::new(self.catalog.clone(), entries);
        let mut report = LoadReport::default();

        for candidate in loader.candidates(plugin_dir)? {
            let resolution = loader.resolve(&candidate)
                .and_then(|resolution| match resolution {
                    Resolution::Plugin(loaded) => self.instantiate(&candidate, loaded).map(|_| None),
                    Resolution::NotAPlugin(reason) => Ok(Some(reason)),
                });

            match resolution {
                Ok(None) => {
                    info!("plugin \"{}\" load success", candidate.name);
                    report.loaded.push(candidate.name);
                }
                Ok(Some(reason)) => {
                    debug!("Skipping {}: {}", candidate.path.display(), reason);
                    report.skipped.push((candidate.name, reason));
                }
                Err(e) => {
                    warn!("Can't load plugin \"{}\", ignore. Error: {}", candidate.name, e);
                    report.failed.push((candidate.name, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Construct one plugin with its own capability handle
    fn instantiate(&self, candidate: &Candidate, loaded: LoadedFactory) -> Result<(), PluginError> {
        let LoadedFactory { factory, description, library } = loaded;
        let name = candidate.name.as_str();

        self.registry.begin(name)?;
        let register = Register::new(name, &self.registry);

        let created = catch_unwind(AssertUnwindSafe(|| factory.create(register)))
            .unwrap_or_else(|payload| Err(PluginError::Construction(format!("panicked: {}", panic_message(payload.as_ref())))));
        drop(factory);

        match created {
            Ok(instance) => self.registry.activate(name, instance, description, library),
            Err(e) => {
                self.registry.discard(name)?;
                Err(e)
            }
        }
    }

    /// Shared registry used by the dispatcher and lifecycle coordinator
    pub fn registry(&self) -> Arc<PluginRegistry> {
        self.registry.clone()
    }

    /// List all active plugins
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.registry.list()
    }

    /// Check if a plugin is active
    pub fn has_plugin(&self, name: &str) -> bool {
        self.registry.is_loaded(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::plugins::MANIFEST_FILE;
    use crate::plugins::trait_def::Plugin;
    use std::fs;

    struct Dummy;
    impl Plugin for Dummy {}

    fn plugin_dir(plugins: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, manifest) in plugins {
            let path = dir.path().join(name);
            fs::create_dir(&path).unwrap();
            fs::write(path.join(MANIFEST_FILE), manifest).unwrap();
        }
        dir
    }

    fn catalog() -> BuiltinCatalog {
        BuiltinCatalog::bundled()
            .with("broken", |_register: Register| -> Result<Box<dyn Plugin>, PluginError> {
                Err(PluginError::Construction("missing api key".into()))
            })
            .with("panicky", |register: Register| -> Result<Box<dyn Plugin>, PluginError> {
                register.register_command("!boom", |_m, _a| Ok(()))?;
                panic!("constructor exploded")
            })
            .with("greedy", |register: Register| -> Result<Box<dyn Plugin>, PluginError> {
                register.register_command("!x", |_m, _a| Ok(()))?;
                register.register_command("!x", |_m, _a| Ok(()))?;
                Ok(Box::new(Dummy))
            })
    }

    #[test]
    fn test_failures_are_isolated() {
        let dir = plugin_dir(&[
            ("a-broken", "builtin: broken\n"),
            ("b-echo", "builtin: echo\n"),
            ("c-panicky", "builtin: panicky\n"),
            ("d-greedy", "builtin: greedy\n"),
            ("e-hello", "builtin: hello-world\n"),
        ]);
        fs::create_dir(dir.path().join("f-assets")).unwrap();

        let manager = PluginManager::new(catalog());
        let report = manager.load_all(dir.path(), PluginEntries::Directories).unwrap();

        assert_eq!(report.loaded, vec!["b-echo", "e-hello"]);
        let failed: Vec<&str> = report.failed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(failed, vec!["a-broken", "c-panicky", "d-greedy"]);
        assert_eq!(report.skipped.len(), 1);
        assert!(!report.is_clean());

        assert!(manager.has_plugin("b-echo"));
        assert!(!manager.has_plugin("c-panicky"));
        // commands registered before the panic are gone with the plugin
        assert!(manager.registry().matching_handlers("!boom").unwrap().is_empty());
        assert_eq!(manager.registry().matching_handlers("!helloworld").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_command_fails_the_constructor() {
        let dir = plugin_dir(&[("greedy", "builtin: greedy\n")]);
        let manager = PluginManager::new(catalog());
        let report = manager.load_all(dir.path(), PluginEntries::Directories).unwrap();

        assert!(report.loaded.is_empty());
        assert!(report.failed[0].1.contains("already registered command '!x'"));
    }

    #[test]
    fn test_report_display() {
        let report = LoadReport {
            loaded: vec!["echo".into(), "hello".into()],
            skipped: vec![("assets".into(), "no plugin.yaml".into())],
            failed: vec![],
        };
        assert_eq!(report.to_string(), "2 loaded, 1 skipped, 0 failed [echo, hello]");
    }
}
