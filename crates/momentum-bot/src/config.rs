//! Bot configuration

use std::time::Duration;

use momentum_store::StoreConfig;

use crate::error::{BotError, Result};

const DEFAULT_REPLICATE_MODEL: &str = "deepseek-ai/deepseek-r1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 300;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Momentum bot process
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token from BotFather
    pub telegram_token: String,

    /// Replicate API token for insight generation
    pub replicate_token: String,

    /// Model identifier on Replicate
    pub replicate_model: String,

    /// Alpha Vantage API key for fundamentals (optional)
    pub alpha_vantage_api_key: Option<String>,

    /// Finnhub API key for news headlines (optional)
    pub finnhub_api_key: Option<String>,

    /// Timeout for ordinary HTTP requests
    pub request_timeout: Duration,

    /// Upper bound on waiting for one insight generation
    pub generation_timeout: Duration,

    /// Long-poll timeout for Telegram getUpdates
    pub poll_timeout: Duration,

    /// Persistent store settings
    pub store: StoreConfig,
}

impl BotConfig {
    /// Load configuration from environment variables
    ///
    /// `TELEGRAM_BOT_TOKEN` and `REPLICATE_API_TOKEN` are required;
    /// everything else has defaults or is optional.
    pub fn from_env() -> Result<Self> {
        let telegram_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| BotError::Config("TELEGRAM_BOT_TOKEN not set".to_string()))?;
        let replicate_token = std::env::var("REPLICATE_API_TOKEN")
            .map_err(|_| BotError::Config("REPLICATE_API_TOKEN not set".to_string()))?;

        let replicate_model = std::env::var("REPLICATE_MODEL")
            .unwrap_or_else(|_| DEFAULT_REPLICATE_MODEL.to_string());

        let store = StoreConfig::from_env()
            .map_err(|err| BotError::Config(err.to_string()))?;

        Ok(Self {
            telegram_token,
            replicate_token,
            replicate_model,
            alpha_vantage_api_key: std::env::var("ALPHA_VANTAGE_API_KEY").ok(),
            finnhub_api_key: std::env::var("FINNHUB_API_KEY").ok(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
            store,
        })
    }
}
