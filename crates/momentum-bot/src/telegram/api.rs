//! Minimal Telegram Bot API client over long polling

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::{BotError, Result};
use crate::telegram::types::{ApiResponse, InlineKeyboardMarkup, Message, Update};

const BASE_URL: &str = "https://api.telegram.org";

/// Handle to one bot token
#[derive(Debug, Clone)]
pub struct TelegramApi {
    client: Client,
    token: String,
}

impl TelegramApi {
    /// `poll_timeout` bounds the long-poll wait; the HTTP timeout adds
    /// headroom on top so the poll request itself never times out first.
    pub fn new(token: impl Into<String>, poll_timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(poll_timeout + Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{BASE_URL}/bot{}/{method}", self.token)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        let envelope: ApiResponse<T> = response.json().await?;

        if !envelope.ok {
            return Err(BotError::Telegram(
                envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed without description")),
            ));
        }
        envelope
            .result
            .ok_or_else(|| BotError::Telegram(format!("{method} returned no result")))
    }

    /// Long-poll for new updates after `offset`
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        let updates: Vec<Update> = self.call("getUpdates", &body).await?;
        if !updates.is_empty() {
            debug!(count = updates.len(), "received updates");
        }
        Ok(updates)
    }

    /// Send a message, optionally with a parse mode and inline keyboard
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode);
        }
        if let Some(markup) = keyboard {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }
        self.call("sendMessage", &body).await
    }

    /// Delete a previously sent message; failures are reported, not fatal
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool> {
        let body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
        });
        self.call("deleteMessage", &body).await
    }

    /// Acknowledge a callback query so the client stops its spinner
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<bool> {
        let body = json!({
            "callback_query_id": callback_query_id,
        });
        self.call("answerCallbackQuery", &body).await
    }
}
