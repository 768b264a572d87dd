//! Yahoo Finance price history client

use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use crate::error::{BotError, Result};

/// One OHLCV bar from Yahoo Finance
#[derive(Debug, Clone, Copy)]
pub struct DailyBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Thin wrapper over the Yahoo Finance chart API
#[derive(Debug, Clone, Default)]
pub struct YahooClient {}

impl YahooClient {
    pub fn new() -> Self {
        Self {}
    }

    fn connector(symbol: &str) -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| BotError::MarketData {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })
    }

    /// Daily bars covering the past `days`, oldest first
    pub async fn daily_history(&self, symbol: &str, days: i64) -> Result<Vec<DailyBar>> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(days);

        let start_odt =
            OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
                BotError::MarketData {
                    symbol: symbol.to_string(),
                    reason: format!("invalid start timestamp: {e}"),
                }
            })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp()).map_err(|e| {
            BotError::MarketData {
                symbol: symbol.to_string(),
                reason: format!("invalid end timestamp: {e}"),
            }
        })?;

        let provider = Self::connector(symbol)?;
        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| BotError::MarketData {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;
        let quotes = response.quotes().map_err(|e| BotError::MarketData {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        Ok(quotes.iter().map(Self::to_bar).collect())
    }

    fn to_bar(quote: &yahoo::Quote) -> DailyBar {
        DailyBar {
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
        }
    }
}
