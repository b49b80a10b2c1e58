//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Settings file loading
//! - Plugins: Candidate discovery, manifests, dynamic loading, the plugin registry
//! - Adapters: Chat service transports (Telegram, console)
//! - Signals: OS termination signals

pub mod adapters;
pub mod config;
pub mod plugins;
pub mod signals;
