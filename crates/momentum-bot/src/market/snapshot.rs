//! Structured market snapshot handed to the insight generator
//!
//! Every field beyond the raw price history is optional: a provider that
//! cannot supply a value reports `None`, never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete picture of one ticker at analysis time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub symbol: String,
    pub company: CompanyProfile,
    pub metrics: FinancialMetrics,
    /// Daily bars over the lookback window, oldest first
    pub history: Vec<PricePoint>,
    /// Derived indicator rows for the most recent sessions
    pub indicators: Vec<IndicatorRow>,
    /// Recent headlines, newest first
    pub headlines: Vec<NewsHeadline>,
}

/// Identifying company information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub summary: Option<String>,
}

/// Named financial metrics; each may be unavailable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub profit_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub book_value: Option<f64>,
    pub analyst_target: Option<f64>,
}

/// One daily close/volume observation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub volume: u64,
}

/// Technical indicators for one session
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub sma_50: f64,
    pub sma_200: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub atr: f64,
    pub obv: f64,
    /// 10-session rate of change; absent until enough history exists
    pub roc_10: Option<f64>,
}

/// One news item attached to a snapshot or digest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsHeadline {
    pub title: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}
