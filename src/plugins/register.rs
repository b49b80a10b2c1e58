//! Capability handle given to each plugin

use std::sync::{Arc, Weak};

use crate::application::errors::{HandlerError, PluginError};
use crate::domain::entities::Message;
use crate::infrastructure::plugins::PluginRegistry;
use crate::plugins::trait_def::PluginEvent;

/// The only object a plugin receives.
///
/// Every call is scoped to the plugin name the handle was issued for; a plugin
/// cannot reach another plugin's namespace, the raw registry or the transport.
/// The handle owns no state: it holds a weak reference back to the host, so
/// calls fail with [`PluginError::HostUnavailable`] once the host is gone.
#[derive(Clone)]
pub struct Register {
    plugin: Arc<str>,
    host: Weak<PluginRegistry>,
}

impl Register {
    pub(crate) fn new(plugin: &str, host: &Arc<PluginRegistry>) -> Self {
        Self {
            plugin: Arc::from(plugin),
            host: Arc::downgrade(host),
        }
    }

    /// Name of the plugin this handle belongs to
    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    fn host(&self) -> Result<Arc<PluginRegistry>, PluginError> {
        self.host.upgrade().ok_or(PluginError::HostUnavailable)
    }

    /// Register `name` for this plugin. Fails with `DuplicateCommand` if the
    /// plugin already owns that name.
    pub fn register_command<F>(&self, name: impl AsRef<str>, handler: F) -> Result<(), PluginError>
    where
        F: Fn(&Message, &[String]) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.host()?.register_command(&self.plugin, name.as_ref(), Arc::new(handler))
    }

    /// Remove one of this plugin's commands. Fails with `UnknownCommand` if absent.
    pub fn unregister_command(&self, name: impl AsRef<str>) -> Result<(), PluginError> {
        self.host()?.unregister_command(&self.plugin, name.as_ref())
    }

    /// Subscribe to a lifecycle event. Callbacks run synchronously, in
    /// subscription order, when the event fires.
    pub fn on_event<F>(&self, event: PluginEvent, callback: F) -> Result<(), PluginError>
    where
        F: Fn() -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.host()?.subscribe(&self.plugin, event, Arc::new(callback))
    }
}

impl std::fmt::Debug for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Register")
            .field("plugin", &self.plugin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::trait_def::Plugin;

    struct Dummy;
    impl Plugin for Dummy {}

    #[test]
    fn test_handle_is_scoped_to_its_plugin() {
        let registry = Arc::new(PluginRegistry::new());
        for name in ["alpha", "beta"] {
            registry.begin(name).unwrap();
            registry.activate(name, Box::new(Dummy), None, None).unwrap();
        }

        let alpha = Register::new("alpha", &registry);
        let beta = Register::new("beta", &registry);
        alpha.register_command("!ping", |_m, _a| Ok(())).unwrap();

        // beta cannot remove alpha's command, and may reuse the name freely
        assert!(matches!(beta.unregister_command("!ping"), Err(PluginError::UnknownCommand { .. })));
        beta.register_command("!ping", |_m, _a| Ok(())).unwrap();
        assert_eq!(registry.matching_handlers("!ping").unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_through_handle_is_rejected() {
        let registry = Arc::new(PluginRegistry::new());
        registry.begin("alpha").unwrap();
        let alpha = Register::new("alpha", &registry);

        alpha.register_command("!ping", |_m, _a| Ok(())).unwrap();
        assert!(matches!(
            alpha.register_command("!ping", |_m, _a| Ok(())),
            Err(PluginError::DuplicateCommand { .. })
        ));
    }

    #[test]
    fn test_handle_outliving_host_fails_cleanly() {
        let registry = Arc::new(PluginRegistry::new());
        registry.begin("alpha").unwrap();
        let alpha = Register::new("alpha", &registry);
        drop(registry);

        assert!(matches!(alpha.on_event(PluginEvent::Exit, || Ok(())), Err(PluginError::HostUnavailable)));
        assert_eq!(alpha.plugin_name(), "alpha");
    }
}
