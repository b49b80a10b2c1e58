//! Plugin trait definitions

use std::fmt;

use crate::application::errors::PluginError;
use crate::plugins::register::Register;

/// A constructed plugin instance.
///
/// The host treats it as an opaque handle: all interaction happens through
/// the commands and events registered on the [`Register`] during construction.
pub trait Plugin: Send + Sync {
    /// Optional: Human-readable description
    fn description(&self) -> Option<&str> {
        None
    }
}

/// Constructs a plugin from its capability handle.
///
/// The constructor is expected to call `register_command` / `on_event`
/// synchronously before returning. Any error (or panic) excludes the plugin
/// from the active set.
pub trait PluginFactory: Send + Sync {
    fn create(&self, register: Register) -> Result<Box<dyn Plugin>, PluginError>;
}

impl<F> PluginFactory for F
where
    F: Fn(Register) -> Result<Box<dyn Plugin>, PluginError> + Send + Sync,
{
    fn create(&self, register: Register) -> Result<Box<dyn Plugin>, PluginError> {
        self(register)
    }
}

/// Boxed factory handed across the dynamic library boundary
pub type FactoryBox = Box<dyn PluginFactory>;

/// Function signature exported by plugin libraries
pub type PluginFactoryFn = unsafe extern "C" fn() -> *mut FactoryBox;

/// Symbol name exported by [`declare_plugin!`]
pub const FACTORY_SYMBOL: &[u8] = b"pluginbot_plugin_factory\0";

/// Process-wide lifecycle events a plugin can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginEvent {
    /// Transport connected, dispatch is active
    Ready,
    /// Process is shutting down
    Exit,
}

impl PluginEvent {
    pub fn as_str(&self) -> &str {
        match self {
            PluginEvent::Ready => "ready",
            PluginEvent::Exit => "exit",
        }
    }
}

impl fmt::Display for PluginEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Export a plugin factory from a `cdylib` plugin crate.
///
/// ```ignore
/// pluginbot::declare_plugin!(|register: pluginbot::plugins::Register| {
///     register.register_command("!ping", |msg, _args| msg.reply("pong"))?;
///     Ok(Box::new(Ping) as Box<dyn pluginbot::plugins::Plugin>)
/// });
/// ```
#[macro_export]
macro_rules! declare_plugin {
    ($factory:expr) => {
        #[no_mangle]
        pub unsafe extern "C" fn pluginbot_plugin_factory() -> *mut $crate::plugins::FactoryBox {
            let factory: $crate::plugins::FactoryBox = Box::new($factory);
            Box::into_raw(Box::new(factory))
        }
    };
}
