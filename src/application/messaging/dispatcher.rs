//! Message dispatcher - Routes messages to every plugin owning the command

use std::sync::Arc;

use crate::application::errors::{guarded, PluginError};
use crate::domain::entities::Message;
use crate::infrastructure::plugins::PluginRegistry;
use super::tokenizer::tokenize;

/// What a dispatch pass did with one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Author is a bot account
    IgnoredBot,
    /// Body has no tokens
    Empty,
    Routed {
        command: String,
        /// Handlers that completed
        handled: usize,
        /// Handlers that returned an error or panicked
        failed: usize,
    },
}

/// Message dispatcher
///
/// Every active plugin that registered the first token as a command gets
/// the message, in plugin load order. A failing handler is logged and the
/// pass continues with the next one.
pub struct Dispatcher {
    registry: Arc<PluginRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Process one inbound message
    pub fn route(&self, message: &Message) -> Result<DispatchOutcome, PluginError> {
        tracing::debug!("Received message [{}] {}", message.chat_id, message.content);

        // Don't process bot messages
        if message.author.is_bot {
            return Ok(DispatchOutcome::IgnoredBot);
        }

        let Some(args) = tokenize(&message.content) else {
            return Ok(DispatchOutcome::Empty);
        };
        let command = args[0].clone();

        // Snapshot so handlers can use their Register without holding the registry lock
        let handlers = self.registry.matching_handlers(&command)?;

        let mut handled = 0;
        let mut failed = 0;
        for (plugin, handler) in handlers {
            match guarded(|| handler(message, &args)) {
                Ok(()) => handled += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!("{}:{} execution fail. {}", plugin, command, e);
                }
            }
        }

        Ok(DispatchOutcome::Routed { command, handled, failed })
    }
}
