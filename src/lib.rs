//! pluginbot - a chat bot host that loads plugins from a directory and
//! routes each incoming message to every plugin command registered for it.
//!
//! Plugin authors depend on this crate for [`plugins::Plugin`],
//! [`plugins::Register`] and [`declare_plugin!`].

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;
