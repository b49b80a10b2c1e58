//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by a command handler or event callback
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    Failed(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),

    #[error("Reply channel unavailable")]
    ReplyUnavailable,
}

impl HandlerError {
    /// Build a `Panicked` error from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        HandlerError::Panicked(panic_message(payload.as_ref()))
    }
}

/// Plugin loading and registration errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Failed to resolve plugin: {0}")]
    Resolution(String),

    #[error("Plugin constructor failed: {0}")]
    Construction(String),

    #[error("Plugin '{plugin}' already registered command '{command}'")]
    DuplicateCommand { plugin: String, command: String },

    #[error("Plugin '{plugin}' has no command '{command}'")]
    UnknownCommand { plugin: String, command: String },

    #[error("Plugin '{0}' is not active")]
    UnknownPlugin(String),

    #[error("Plugin host is gone")]
    HostUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Can't read settings file {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file {path} is not valid JSON: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Run a plugin-supplied closure, turning a panic into `HandlerError::Panicked`.
pub fn guarded<F>(f: F) -> Result<(), HandlerError>
where
    F: FnOnce() -> Result<(), HandlerError>,
{
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(HandlerError::from_panic(payload)))
}

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
