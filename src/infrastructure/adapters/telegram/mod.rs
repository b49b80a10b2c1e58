//! Telegram transport

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::application::errors::BotError;
use crate::domain::entities::{self, Reply};
use crate::domain::traits::{BotInfo, Transport};

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Long-poll timeout for getUpdates
const POLL_TIMEOUT_SECS: i64 = 30;

/// Back-off after a failed poll
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    result: T,
}

/// Telegram transport using long polling
pub struct TelegramTransport {
    token: String,
    client: Client,
    offset: AtomicI64,
}

impl TelegramTransport {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            offset: AtomicI64::new(0),
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    async fn call<Req: Serialize + Sync, Resp: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        request: &Req,
    ) -> Result<Resp, BotError> {
        let response = self.client
            .post(self.api_url(method))
            .json(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => {
                return Err(BotError::Auth("Telegram rejected the bot token".to_string()));
            }
            status => {
                return Err(BotError::Network(format!("Telegram API error on {}: {}", method, status)));
            }
        }

        let data: ApiResponse<Resp> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.result)
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64, timeout: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: i64,
            allowed_updates: Vec<String>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };
        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update]) -> Option<i64> {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
    }

    /// Convert text updates into inbound messages
    pub fn to_messages(updates: &[Update]) -> Vec<entities::Message> {
        updates.iter()
            .filter_map(|u| u.message.as_ref())
            .filter_map(|msg| {
                let text = msg.text.clone()?;
                let author = match &msg.from {
                    Some(from) => {
                        let mut user = entities::User::new(from.id.to_string());
                        user.is_bot = from.is_bot;
                        user.username = from.username.clone();
                        user.first_name = from.first_name.clone();
                        user
                    }
                    // Channel posts have no sender
                    None => entities::User::new(msg.chat.id.to_string()),
                };
                Some(
                    entities::Message::new(msg.chat.id.to_string(), author, text)
                        .with_id(msg.message_id.to_string())
                        .with_platform("telegram"),
                )
            })
            .collect()
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn connect(&self) -> Result<BotInfo, BotError> {
        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let me: BotInfoResponse = self.call("getMe", &serde_json::json!({})).await?;
        Ok(BotInfo {
            id: me.id.to_string(),
            name: me.first_name,
            username: me.username,
        })
    }

    async fn poll(&self) -> Result<Option<Vec<entities::Message>>, BotError> {
        let offset = self.offset.load(Ordering::SeqCst);
        match self.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                if let Some(next) = Self::get_next_offset(&updates) {
                    self.offset.store(next, Ordering::SeqCst);
                }
                Ok(Some(Self::to_messages(&updates)))
            }
            Err(e @ BotError::Auth(_)) => Err(e),
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(RETRY_DELAY).await;
                Ok(Some(Vec::new()))
            }
        }
    }

    async fn send(&self, reply: &Reply) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: &'a str,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            reply_to_message_id: Option<i64>,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            #[allow(dead_code)]
            message_id: i64,
        }

        let request = SendMessageRequest {
            chat_id: &reply.chat_id,
            text: &reply.text,
            reply_to_message_id: reply.in_reply_to.as_deref().and_then(|id| id.parse().ok()),
        };
        let _: MessageResult = self.call("sendMessage", &request).await?;
        Ok(())
    }

    fn platform(&self) -> &str {
        "telegram"
    }
}
