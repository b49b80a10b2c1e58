//! Plugin system for pluginbot
//!
//! Plugins are constructed once at startup, each with its own [`Register`]
//! capability handle, and extend the bot by registering commands and
//! lifecycle event callbacks.

pub mod builtin;
pub mod manager;
pub mod register;
pub mod trait_def;

pub use builtin::BuiltinCatalog;
pub use manager::{LoadReport, PluginManager};
pub use register::Register;
pub use trait_def::{FactoryBox, Plugin, PluginEvent, PluginFactory, PluginFactoryFn, FACTORY_SYMBOL};
