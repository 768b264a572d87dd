//! Error types for the bot glue layer

use thiserror::Error;

/// Errors raised while orchestrating a chat interaction
#[derive(Debug, Error)]
pub enum BotError {
    /// Persistent store failure; the billable action must be denied
    #[error("store error: {0}")]
    Store(#[from] momentum_store::StoreError),

    /// Network or HTTP error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Market data provider failure
    #[error("market data error for {symbol}: {reason}")]
    MarketData { symbol: String, reason: String },

    /// Upstream API request failed
    #[error("API error: {0}")]
    Api(String),

    /// Ticker symbol rejected by validation
    #[error("invalid ticker: {0}")]
    InvalidTicker(String),

    /// Telegram Bot API returned a failure payload
    #[error("telegram API error: {0}")]
    Telegram(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;
