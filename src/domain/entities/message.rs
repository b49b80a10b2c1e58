use super::User;
use crate::application::errors::HandlerError;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Outgoing reply produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: String,
    /// Platform id of the message being answered
    pub in_reply_to: Option<String>,
    pub text: String,
}

/// Sink the transport drains to deliver replies
pub type ReplySink = mpsc::UnboundedSender<Reply>;

/// Represents an inbound chat message
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub author: User,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub platform: String,
    replies: Option<ReplySink>,
}

impl Message {
    pub fn new(chat_id: impl Into<String>, author: User, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            author,
            content: content.into(),
            timestamp: Utc::now(),
            platform: "unknown".to_string(),
            replies: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_reply_sink(mut self, sink: ReplySink) -> Self {
        self.replies = Some(sink);
        self
    }

    /// Reply in the originating chat. Never blocks: the reply is queued
    /// for the transport's sender task.
    pub fn reply(&self, text: impl Into<String>) -> Result<(), HandlerError> {
        let sink = self.replies.as_ref().ok_or(HandlerError::ReplyUnavailable)?;
        sink.send(Reply {
            chat_id: self.chat_id.clone(),
            in_reply_to: Some(self.id.clone()),
            text: text.into(),
        })
        .map_err(|_| HandlerError::ReplyUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_is_queued_for_chat() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let msg = Message::new("chat-1", User::new("u1"), "!ping")
            .with_id("m-9")
            .with_reply_sink(tx);

        msg.reply("pong").unwrap();

        let reply = rx.try_recv().unwrap();
        assert_eq!(reply.chat_id, "chat-1");
        assert_eq!(reply.in_reply_to.as_deref(), Some("m-9"));
        assert_eq!(reply.text, "pong");
    }

    #[test]
    fn test_reply_without_sink_fails() {
        let msg = Message::new("chat-1", User::new("u1"), "!ping");
        assert!(matches!(msg.reply("pong"), Err(HandlerError::ReplyUnavailable)));
    }
}
