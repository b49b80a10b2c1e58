//! Statically linked plugins, selected from a manifest with `builtin: <kind>`

pub mod echo;
pub mod hello_world;

use std::collections::HashMap;
use std::sync::Arc;

use crate::plugins::trait_def::PluginFactory;

/// Plugin kinds compiled into the host
#[derive(Clone, Default)]
pub struct BuiltinCatalog {
    factories: HashMap<String, Arc<dyn PluginFactory>>,
}

impl BuiltinCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the plugins shipped in this crate
    pub fn bundled() -> Self {
        Self::new()
            .with(hello_world::KIND, hello_world::create)
            .with(echo::KIND, echo::create)
    }

    pub fn with<F: PluginFactory + 'static>(mut self, kind: impl Into<String>, factory: F) -> Self {
        self.factories.insert(kind.into(), Arc::new(factory));
        self
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn PluginFactory>> {
        self.factories.get(kind).cloned()
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_kinds() {
        let catalog = BuiltinCatalog::bundled();
        assert_eq!(catalog.kinds(), vec!["echo", "hello-world"]);
        assert!(catalog.get("echo").is_some());
        assert!(catalog.get("nope").is_none());
    }
}
