//! Echo plugin - replies with its first argument

use crate::application::errors::{HandlerError, PluginError};
use crate::plugins::{Plugin, PluginEvent, Register};

pub const KIND: &str = "echo";

pub struct Echo;

impl Plugin for Echo {
    fn description(&self) -> Option<&str> {
        Some("Echoes the first argument of !echo")
    }
}

pub fn create(register: Register) -> Result<Box<dyn Plugin>, PluginError> {
    register.register_command("!echo", |message, args| match args.get(1) {
        Some(text) => message.reply(text.as_str()),
        None => {
            message.reply("Usage: !echo <text>")?;
            Err(HandlerError::InvalidArgs("missing text".to_string()))
        }
    })?;

    let name = register.plugin_name().to_string();
    register.on_event(PluginEvent::Ready, move || {
        tracing::info!("[{}] ready to echo", name);
        Ok(())
    })?;

    let name = register.plugin_name().to_string();
    register.on_event(PluginEvent::Exit, move || {
        tracing::info!("[{}] goodbye", name);
        Ok(())
    })?;

    Ok(Box::new(Echo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Message, User};
    use crate::infrastructure::plugins::PluginRegistry;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[test]
    fn test_echo_replies_with_first_argument() {
        let registry = Arc::new(PluginRegistry::new());
        registry.begin("echo").unwrap();
        let instance = create(Register::new("echo", &registry)).unwrap();
        registry.activate("echo", instance, None, None).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let msg = Message::new("c", User::new("u"), "!echo hi").with_reply_sink(tx);
        let (_, handler) = registry.matching_handlers("!echo").unwrap().remove(0);

        handler(&msg, &["!echo".to_string(), "hi".to_string()]).unwrap();
        assert!(matches!(
            handler(&msg, &["!echo".to_string()]),
            Err(HandlerError::InvalidArgs(_))
        ));

        assert_eq!(rx.try_recv().unwrap().text, "hi");
        assert_eq!(rx.try_recv().unwrap().text, "Usage: !echo <text>");
        assert_eq!(registry.subscribers(PluginEvent::Exit).unwrap().len(), 1);
    }
}
