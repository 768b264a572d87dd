//! Per-chat conversation state
//!
//! The only state the bot keeps in memory is whether a chat is waiting for a
//! ticker. Everything durable lives in the store, so losing this map on
//! restart costs nothing more than a re-tap of the Analyze button.

use std::collections::HashMap;
use std::sync::Mutex;

/// What the bot expects from a chat next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    #[default]
    Idle,
    /// The next text message is treated as a ticker symbol
    AwaitingTicker,
}

/// In-memory chat mode registry
#[derive(Debug, Default)]
pub struct Sessions {
    modes: Mutex<HashMap<i64, ChatMode>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self, chat_id: i64) -> ChatMode {
        self.modes
            .lock()
            .map(|modes| modes.get(&chat_id).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn set_mode(&self, chat_id: i64, mode: ChatMode) {
        if let Ok(mut modes) = self.modes.lock() {
            match mode {
                ChatMode::Idle => {
                    modes.remove(&chat_id);
                }
                other => {
                    modes.insert(chat_id, other);
                }
            }
        }
    }

    /// Read and clear in one step, for consuming the awaited ticker
    pub fn take_mode(&self, chat_id: i64) -> ChatMode {
        self.modes
            .lock()
            .map(|mut modes| modes.remove(&chat_id).unwrap_or_default())
            .unwrap_or_default()
    }
}
