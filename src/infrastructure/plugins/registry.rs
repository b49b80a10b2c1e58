//! Plugin registry - Active plugin records, their commands and event subscriptions

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use libloading::Library;

use crate::application::errors::{HandlerError, PluginError};
use crate::domain::entities::{CommandHandler, CommandRegistry};
use crate::plugins::trait_def::{Plugin, PluginEvent};

/// Event callback type
pub type EventCallback = Arc<dyn Fn() -> Result<(), HandlerError> + Send + Sync>;

struct Subscription {
    event: PluginEvent,
    callback: EventCallback,
}

/// One plugin's record.
///
/// Fields drop in declaration order: handlers, subscriptions and the instance
/// may hold code from `library`, so the library goes last.
struct PluginRecord {
    name: String,
    commands: CommandRegistry,
    subscriptions: Vec<Subscription>,
    instance: Option<Box<dyn Plugin>>,
    description: Option<String>,
    #[allow(dead_code)]
    library: Option<Library>,
}

impl PluginRecord {
    fn is_active(&self) -> bool {
        self.instance.is_some()
    }
}

/// Plugin information for listing
#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: Option<String>,
    pub commands: Vec<String>,
}

/// Registry of plugins in load order.
///
/// A record is `pending` while its constructor runs and `active` once the
/// instance is stored. Only active records take part in dispatch and events.
pub struct PluginRegistry {
    plugins: RwLock<Vec<PluginRecord>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<PluginRecord>>, PluginError> {
        self.plugins.read()
            .map_err(|_| PluginError::Internal("Lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<PluginRecord>>, PluginError> {
        self.plugins.write()
            .map_err(|_| PluginError::Internal("Lock poisoned".to_string()))
    }

    fn with_record<T>(
        &self,
        plugin: &str,
        f: impl FnOnce(&mut PluginRecord) -> Result<T, PluginError>,
    ) -> Result<T, PluginError> {
        let mut plugins = self.write()?;
        let record = plugins.iter_mut()
            .find(|r| r.name == plugin)
            .ok_or_else(|| PluginError::UnknownPlugin(plugin.to_string()))?;
        f(record)
    }

    /// Open a pending record for a plugin about to be constructed
    pub(crate) fn begin(&self, name: &str) -> Result<(), PluginError> {
        let mut plugins = self.write()?;
        if plugins.iter().any(|r| r.name == name) {
            return Err(PluginError::Resolution(format!("Plugin '{}' already loaded", name)));
        }
        plugins.push(PluginRecord {
            name: name.to_string(),
            commands: CommandRegistry::new(name),
            subscriptions: Vec::new(),
            instance: None,
            description: None,
            library: None,
        });
        Ok(())
    }

    /// Store the constructed instance, making the plugin active
    pub(crate) fn activate(
        &self,
        name: &str,
        instance: Box<dyn Plugin>,
        description: Option<String>,
        library: Option<Library>,
    ) -> Result<(), PluginError> {
        self.with_record(name, |record| {
            record.description = description.or_else(|| instance.description().map(str::to_string));
            record.instance = Some(instance);
            record.library = library;
            Ok(())
        })
    }

    /// Drop a plugin and everything it registered
    pub(crate) fn discard(&self, name: &str) -> Result<(), PluginError> {
        let removed = {
            let mut plugins = self.write()?;
            let index = plugins.iter()
                .position(|r| r.name == name)
                .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))?;
            plugins.remove(index)
        };
        drop(removed);
        Ok(())
    }

    pub fn register_command(&self, plugin: &str, command: &str, handler: CommandHandler) -> Result<(), PluginError> {
        self.with_record(plugin, |record| record.commands.register(command, handler))
    }

    pub fn unregister_command(&self, plugin: &str, command: &str) -> Result<(), PluginError> {
        self.with_record(plugin, |record| record.commands.unregister(command))
    }

    pub fn subscribe(&self, plugin: &str, event: PluginEvent, callback: EventCallback) -> Result<(), PluginError> {
        self.with_record(plugin, |record| {
            record.subscriptions.push(Subscription { event, callback });
            Ok(())
        })
    }

    /// Handlers registered for `command`, one per active plugin that owns it, in load order
    pub fn matching_handlers(&self, command: &str) -> Result<Vec<(String, CommandHandler)>, PluginError> {
        let plugins = self.read()?;
        Ok(plugins.iter()
            .filter(|r| r.is_active())
            .filter_map(|r| r.commands.get(command).map(|h| (r.name.clone(), h.clone())))
            .collect())
    }

    /// Callbacks subscribed to `event`, in load order then subscription order
    pub fn subscribers(&self, event: PluginEvent) -> Result<Vec<(String, EventCallback)>, PluginError> {
        let plugins = self.read()?;
        Ok(plugins.iter()
            .filter(|r| r.is_active())
            .flat_map(|r| {
                r.subscriptions.iter()
                    .filter(move |s| s.event == event)
                    .map(move |s| (r.name.clone(), s.callback.clone()))
            })
            .collect())
    }

    /// Names of active plugins in load order
    pub fn names(&self) -> Vec<String> {
        self.read()
            .map(|p| p.iter().filter(|r| r.is_active()).map(|r| r.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Check if a plugin is active
    pub fn is_loaded(&self, name: &str) -> bool {
        self.read()
            .map(|p| p.iter().any(|r| r.name == name && r.is_active()))
            .unwrap_or(false)
    }

    pub fn list(&self) -> Vec<PluginInfo> {
        self.read()
            .map(|p| {
                p.iter()
                    .filter(|r| r.is_active())
                    .map(|r| {
                        let mut commands: Vec<String> = r.commands.names().map(str::to_string).collect();
                        commands.sort();
                        PluginInfo {
                            name: r.name.clone(),
                            description: r.description.clone(),
                            commands,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of active plugins
    pub fn len(&self) -> usize {
        self.names().len()
    }

    /// Check if no plugins are active
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
