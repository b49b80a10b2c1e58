use async_trait::async_trait;
use crate::domain::entities::{Message, Reply};
use crate::application::errors::BotError;

/// Transport trait - abstraction for the remote chat service.
///
/// The host only consumes it as a message source and a reply sink.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect and authenticate. Returning `Ok` is the `ready` signal.
    async fn connect(&self) -> Result<BotInfo, BotError>;

    /// Wait for the next batch of inbound messages.
    ///
    /// `Ok(None)` means the source is closed and the host should exit normally.
    async fn poll(&self) -> Result<Option<Vec<Message>>, BotError>;

    /// Deliver a reply produced by a handler
    async fn send(&self, reply: &Reply) -> Result<(), BotError>;

    /// Short platform name used in logs
    fn platform(&self) -> &str;
}

/// Bot account information reported on connect
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
