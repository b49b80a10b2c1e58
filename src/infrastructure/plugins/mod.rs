//! Plugin discovery and storage
//!
//! A plugin is a directory holding a `plugin.yaml` manifest that points either
//! at a statically linked builtin kind or at a shared library exporting the
//! factory declared with `declare_plugin!`.

pub mod loader;
pub mod manifest;
pub mod registry;

pub use loader::{Candidate, LoadedFactory, PluginLoader, Resolution};
pub use manifest::{PluginManifest, MANIFEST_FILE};
pub use registry::{EventCallback, PluginInfo, PluginRegistry};
