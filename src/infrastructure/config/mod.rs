//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::application::errors::ConfigError;

/// Default settings file name
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Token written into a generated settings file
pub const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN";

/// Which directory entries are plugin candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginEntries {
    /// Each subdirectory with a `plugin.yaml`
    #[default]
    Directories,
    /// Each dynamic library file
    Files,
}

/// Resolved bot configuration, read once at startup
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Display name
    pub name: String,
    /// Transport credential
    pub token: String,
    /// Directory scanned for plugins
    #[serde(alias = "pluginFolderPath")]
    pub plugin_directory: PathBuf,
    #[serde(default)]
    pub plugin_entries: PluginEntries,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "Pluginbot".to_string(),
            token: TOKEN_PLACEHOLDER.to_string(),
            plugin_directory: PathBuf::from("./plugins"),
            plugin_entries: PluginEntries::Directories,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Unavailable { path: path.to_path_buf(), source })?;

        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)
            .map_err(|source| ConfigError::Invalid { path: path.to_path_buf(), source })?;

        if config.name.trim().is_empty() {
            return Err(ConfigError::MissingField("name".to_string()));
        }
        Ok(config)
    }

    /// Apply `BOT_TOKEN` from the environment, if set
    pub fn with_env(mut self) -> Self {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            if !token.is_empty() {
                self.token = token;
            }
        }
        self
    }

    /// True when the token is missing or still the generated placeholder
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty() && self.token != TOKEN_PLACEHOLDER
    }

    /// Write default settings to `path`, moving an existing file to
    /// `<stem>_old<ext>` first.
    pub fn write_default(path: impl AsRef<Path>) -> Result<Option<PathBuf>, std::io::Error> {
        let path = path.as_ref();
        let backup = if path.exists() {
            let backup = backup_path(path);
            std::fs::rename(path, &backup)?;
            Some(backup)
        } else {
            None
        };

        let content = serde_json::to_string_pretty(&Config::default())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(backup)
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("settings");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_old.{}", stem, ext),
        None => format!("{}_old", stem),
    };
    path.with_file_name(name)
}
