//! Telegram transport layer

pub mod api;
pub mod types;

pub use api::TelegramApi;
pub use types::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, TelegramUser, Update,
};
