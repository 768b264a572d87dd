//! Market data collection
//!
//! [`MarketDataProvider`] is the seam the orchestrator talks to; the
//! [`MomentumMarketData`] composite fans out to Yahoo Finance for prices,
//! Alpha Vantage for fundamentals and Finnhub for news. Prices are required,
//! the other two feeds degrade to empty sections when absent or failing.

pub mod fundamentals;
pub mod indicators;
pub mod news;
pub mod snapshot;
pub mod yahoo;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::market::fundamentals::FundamentalsClient;
use crate::market::news::NewsClient;
use crate::market::snapshot::{
    CompanyProfile, FinancialMetrics, NewsHeadline, PricePoint, StockSnapshot,
};
use crate::market::yahoo::YahooClient;

/// Trading days of history fetched for indicator computation
const HISTORY_DAYS: i64 = 365;
/// Headlines included in a stock snapshot
const SNAPSHOT_HEADLINES: usize = 5;
/// Headlines included in a market news digest
const DIGEST_HEADLINES: usize = 10;

/// Source of everything the analysis prompt needs about a stock
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Assemble the full data snapshot for one symbol
    async fn fetch_snapshot(&self, symbol: &str) -> Result<StockSnapshot>;

    /// Current top business headlines, possibly empty
    async fn top_business_headlines(&self) -> Result<Vec<NewsHeadline>>;
}

/// Production provider backed by the public market data APIs
pub struct MomentumMarketData {
    yahoo: YahooClient,
    fundamentals: Option<FundamentalsClient>,
    news: Option<NewsClient>,
}

impl MomentumMarketData {
    pub fn new(
        yahoo: YahooClient,
        fundamentals: Option<FundamentalsClient>,
        news: Option<NewsClient>,
    ) -> Self {
        Self {
            yahoo,
            fundamentals,
            news,
        }
    }
}

#[async_trait]
impl MarketDataProvider for MomentumMarketData {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<StockSnapshot> {
        // Price history is the one hard requirement; without bars there is
        // nothing to analyze.
        let bars = self.yahoo.daily_history(symbol, HISTORY_DAYS).await?;

        let history: Vec<PricePoint> = bars
            .iter()
            .map(|bar| PricePoint {
                timestamp: bar.timestamp,
                close: bar.close,
                volume: bar.volume,
            })
            .collect();
        let indicator_rows =
            indicators::indicator_tail(indicators::compute_indicators(&bars));
        let latest_close = bars.last().map(|bar| bar.close);

        let (mut company, mut metrics) = (CompanyProfile::default(), FinancialMetrics::default());
        if let Some(fundamentals) = &self.fundamentals {
            match fundamentals.get_overview(symbol).await {
                Ok(overview) => {
                    company = overview.profile();
                    metrics = overview.metrics();
                }
                Err(error) => {
                    warn!(symbol, %error, "fundamentals unavailable, continuing without");
                }
            }
        }
        metrics.current_price = latest_close;

        let mut headlines = Vec::new();
        if let Some(news) = &self.news {
            match news.recent_company_news(symbol, SNAPSHOT_HEADLINES).await {
                Ok(items) => headlines = items,
                Err(error) => {
                    warn!(symbol, %error, "company news unavailable, continuing without");
                }
            }
        }

        Ok(StockSnapshot {
            symbol: symbol.to_string(),
            company,
            metrics,
            history,
            indicators: indicator_rows,
            headlines,
        })
    }

    async fn top_business_headlines(&self) -> Result<Vec<NewsHeadline>> {
        match &self.news {
            Some(news) => news.market_news("general", DIGEST_HEADLINES).await,
            None => Ok(Vec::new()),
        }
    }
}
