//! Long-poll loop wiring Telegram updates into the orchestrator

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::bot::{Orchestrator, Outcome, Reply, messages};
use crate::telegram::TelegramApi;
use crate::telegram::types::Update;

/// Pause before retrying after a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Owns the transport loop; all decision making stays in the orchestrator
pub struct BotRunner {
    api: TelegramApi,
    orchestrator: Arc<Orchestrator>,
    poll_timeout: Duration,
}

impl BotRunner {
    pub fn new(api: TelegramApi, orchestrator: Arc<Orchestrator>, poll_timeout: Duration) -> Self {
        Self {
            api,
            orchestrator,
            poll_timeout,
        }
    }

    /// Poll forever; cancel externally (e.g. via `tokio::select!`) to stop
    pub async fn run(&self) {
        info!("bot polling started");
        let mut offset = 0_i64;
        loop {
            let updates = match self.api.get_updates(offset, self.poll_timeout).await {
                Ok(updates) => updates,
                Err(err) => {
                    warn!(%err, "getUpdates failed, retrying");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                self.dispatch(update).await;
            }
        }
    }

    async fn dispatch(&self, update: Update) {
        if let Some(message) = update.message {
            let Some(text) = message.text.as_deref() else {
                return;
            };
            let chat_id = message.chat.id;
            let outcome = self
                .orchestrator
                .handle_message(chat_id, message.from.as_ref(), text)
                .await;
            self.deliver(chat_id, outcome).await;
        } else if let Some(callback) = update.callback_query {
            // Acknowledge first so the client stops its spinner even when
            // the rest of the handling is slow.
            if let Err(err) = self.api.answer_callback_query(&callback.id).await {
                warn!(%err, "failed to answer callback query");
            }
            let Some(chat_id) = callback.message.as_ref().map(|m| m.chat.id) else {
                return;
            };
            let Some(data) = callback.data.as_deref() else {
                return;
            };
            let outcome = self
                .orchestrator
                .handle_callback(chat_id, Some(&callback.from), data)
                .await;
            self.deliver(chat_id, outcome).await;
        }
    }

    async fn deliver(&self, chat_id: i64, outcome: Outcome) {
        match outcome {
            Outcome::Reply(reply) => self.send(chat_id, &reply).await,
            Outcome::Analyze { user, symbol } => {
                let loading = self.send_loading(chat_id, &messages::loading_text(&symbol)).await;
                let reply = self.orchestrator.run_analysis(&user, &symbol).await;
                self.clear_loading(chat_id, loading).await;
                self.send(chat_id, &reply).await;
            }
            Outcome::NewsDigest { user } => {
                let loading = self.send_loading(chat_id, &messages::news_loading_text()).await;
                let reply = self.orchestrator.run_news_digest(&user).await;
                self.clear_loading(chat_id, loading).await;
                self.send(chat_id, &reply).await;
            }
            Outcome::Ignored => {}
        }
    }

    async fn send(&self, chat_id: i64, reply: &Reply) {
        if let Err(err) = self
            .api
            .send_message(chat_id, &reply.text, reply.parse_mode, reply.keyboard.as_ref())
            .await
        {
            error!(chat_id, %err, "failed to send message");
        }
    }

    async fn send_loading(&self, chat_id: i64, text: &str) -> Option<i64> {
        match self.api.send_message(chat_id, text, None, None).await {
            Ok(message) => Some(message.message_id),
            Err(err) => {
                warn!(chat_id, %err, "failed to send loading message");
                None
            }
        }
    }

    async fn clear_loading(&self, chat_id: i64, message_id: Option<i64>) {
        if let Some(message_id) = message_id {
            if let Err(err) = self.api.delete_message(chat_id, message_id).await {
                warn!(chat_id, message_id, %err, "failed to delete loading message");
            }
        }
    }
}
