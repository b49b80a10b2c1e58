//! Plugin manifest definition

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::errors::PluginError;

/// File name looked up in each candidate directory
pub const MANIFEST_FILE: &str = "plugin.yaml";

/// Plugin metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginManifest {
    /// Plugin version
    pub version: Option<String>,

    /// Plugin description
    pub description: Option<String>,

    /// Plugin author
    pub author: Option<String>,

    /// Disabled plugins are skipped like non-plugins
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Name of a statically linked plugin kind
    pub builtin: Option<String>,

    /// Path to the shared library, relative to the plugin directory
    pub library: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

impl PluginManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PluginError::Resolution(format!("Failed to read manifest: {}", e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, PluginError> {
        let manifest: Self = serde_yaml::from_str(content)
            .map_err(|e| PluginError::Resolution(format!("Failed to parse manifest: {}", e)))?;

        if manifest.builtin.is_some() && manifest.library.is_some() {
            return Err(PluginError::Resolution(
                "Manifest sets both 'builtin' and 'library'".to_string(),
            ));
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtin_manifest() {
        let manifest = PluginManifest::parse("builtin: echo\ndescription: Echo things back\n").unwrap();
        assert_eq!(manifest.builtin.as_deref(), Some("echo"));
        assert_eq!(manifest.description.as_deref(), Some("Echo things back"));
        assert!(manifest.enabled);
        assert!(manifest.library.is_none());
    }

    #[test]
    fn test_parse_disabled_library_manifest() {
        let manifest = PluginManifest::parse("library: libdice.so\nenabled: false\nversion: \"1.2.0\"\n").unwrap();
        assert_eq!(manifest.library, Some(PathBuf::from("libdice.so")));
        assert!(!manifest.enabled);
        assert_eq!(manifest.version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_builtin_and_library_are_exclusive() {
        let err = PluginManifest::parse("builtin: echo\nlibrary: libecho.so\n").unwrap_err();
        assert!(matches!(err, PluginError::Resolution(_)));
    }

    #[test]
    fn test_invalid_yaml_is_a_resolution_error() {
        assert!(matches!(PluginManifest::parse("builtin: [unclosed"), Err(PluginError::Resolution(_))));
    }
}
