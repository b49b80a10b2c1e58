//! Console transport for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::{Message, Reply, User};
use crate::domain::traits::{BotInfo, Transport};

/// Chat id used for every console message
const CONSOLE_CHAT: &str = "console";

/// Console transport: each stdin line is a message, replies go to stdout
pub struct ConsoleTransport {
    name: String,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    fn message(line: String) -> Message {
        let author = User::new("console").with_username("you");
        Message::new(CONSOLE_CHAT, author, line).with_platform("console")
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn connect(&self) -> Result<BotInfo, BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(BotInfo {
            id: "console".to_string(),
            name: self.name.clone(),
            username: "console".to_string(),
        })
    }

    async fn poll(&self) -> Result<Option<Vec<Message>>, BotError> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await? {
            Some(line) => Ok(Some(vec![Self::message(line)])),
            None => Ok(None),
        }
    }

    async fn send(&self, reply: &Reply) -> Result<(), BotError> {
        println!("[BOT] {}", reply.text);
        Ok(())
    }

    fn platform(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_message_comes_from_a_human() {
        let msg = ConsoleTransport::message("!echo hi".to_string());
        assert_eq!(msg.chat_id, CONSOLE_CHAT);
        assert_eq!(msg.content, "!echo hi");
        assert!(!msg.author.is_bot);
    }
}
