//! Momentum Telegram bot
//!
//! Glue between the Telegram Bot API, the market data providers, the
//! Replicate insight model and the credit-accounted user store. The credit
//! policy itself lives in `momentum-store`; this crate decides when to
//! charge and what to say.

pub mod bot;
pub mod config;
pub mod error;
pub mod insight;
pub mod market;
pub mod telegram;
pub mod validation;

pub use bot::{Orchestrator, Outcome, Reply, runner::BotRunner};
pub use config::BotConfig;
pub use error::{BotError, Result};
