use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::{HandlerError, PluginError};
use crate::domain::entities::Message;

/// Command handler function type.
///
/// Receives the originating message and every token of the message body,
/// the command name included at index 0.
pub type CommandHandler = Arc<dyn Fn(&Message, &[String]) -> Result<(), HandlerError> + Send + Sync>;

/// Commands owned by a single plugin.
///
/// Names are exact strings (`!ping`, not `ping`); there is no alias or
/// prefix matching.
pub struct CommandRegistry {
    owner: String,
    commands: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            commands: HashMap::new(),
        }
    }

    /// Store a handler. A name already present is rejected and the
    /// existing handler is kept.
    pub fn register(&mut self, name: impl Into<String>, handler: CommandHandler) -> Result<(), PluginError> {
        let name = name.into();
        if self.commands.contains_key(&name) {
            return Err(PluginError::DuplicateCommand {
                plugin: self.owner.clone(),
                command: name,
            });
        }
        self.commands.insert(name, handler);
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<(), PluginError> {
        match self.commands.remove(name) {
            Some(_) => Ok(()),
            None => Err(PluginError::UnknownCommand {
                plugin: self.owner.clone(),
                command: name.to_string(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandHandler> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(counter: Arc<AtomicUsize>) -> CommandHandler {
        Arc::new(move |_msg, _args| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_duplicate_registration_keeps_first_handler() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new("alpha");

        registry.register("!ping", counting_handler(first.clone())).unwrap();
        let err = registry.register("!ping", counting_handler(second.clone())).unwrap_err();
        assert!(matches!(err, PluginError::DuplicateCommand { ref plugin, ref command }
            if plugin == "alpha" && command == "!ping"));

        let msg = Message::new("c", User::new("u"), "!ping");
        let handler = registry.get("!ping").unwrap();
        handler(&msg, &["!ping".to_string()]).unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregister_unknown_command_fails() {
        let mut registry = CommandRegistry::new("alpha");
        let err = registry.unregister("!nope").unwrap_err();
        assert!(matches!(err, PluginError::UnknownCommand { .. }));
    }

    #[test]
    fn test_unregister_then_register_again() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new("alpha");
        registry.register("!ping", counting_handler(counter.clone())).unwrap();
        registry.unregister("!ping").unwrap();
        assert!(registry.is_empty());
        registry.register("!ping", counting_handler(counter)).unwrap();
        assert!(registry.contains("!ping"));
    }

    #[test]
    fn test_lookup_is_exact() {
        let mut registry = CommandRegistry::new("alpha");
        registry.register("!Ping", counting_handler(Arc::new(AtomicUsize::new(0)))).unwrap();
        assert!(registry.get("!ping").is_none());
        assert!(registry.get("!Pin").is_none());
        assert!(registry.get("!Ping").is_some());
    }
}
