//! Finnhub news client

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{BotError, Result};
use crate::market::snapshot::NewsHeadline;

const BASE_URL: &str = "https://finnhub.io/api/v1";

/// One Finnhub news article
#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    pub category: Option<String>,
    /// Publish time (UNIX timestamp)
    pub datetime: i64,
    pub headline: String,
    pub source: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

impl NewsArticle {
    fn into_headline(self) -> NewsHeadline {
        NewsHeadline {
            title: self.headline,
            source: self.source,
            url: self.url,
            summary: self.summary,
            published_at: DateTime::from_timestamp(self.datetime, 0),
        }
    }
}

/// Client for Finnhub company and market news
pub struct NewsClient {
    client: Client,
    api_key: String,
}

impl NewsClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
        }
    }

    /// Recent news for a specific symbol, newest first
    ///
    /// `from` / `to` are dates in `YYYY-MM-DD` form.
    pub async fn company_news(
        &self,
        symbol: &str,
        from: &str,
        to: &str,
        limit: usize,
    ) -> Result<Vec<NewsHeadline>> {
        let url = format!(
            "{BASE_URL}/company-news?symbol={symbol}&from={from}&to={to}&token={}",
            self.api_key
        );
        self.fetch(&url, limit).await
    }

    /// General market headlines, newest first
    pub async fn market_news(&self, category: &str, limit: usize) -> Result<Vec<NewsHeadline>> {
        let url = format!("{BASE_URL}/news?category={category}&token={}", self.api_key);
        self.fetch(&url, limit).await
    }

    /// Company news over the trailing week
    pub async fn recent_company_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsHeadline>> {
        let to = Utc::now();
        let from = to - chrono::Duration::days(7);
        self.company_news(
            symbol,
            &from.format("%Y-%m-%d").to_string(),
            &to.format("%Y-%m-%d").to_string(),
            limit,
        )
        .await
    }

    async fn fetch(&self, url: &str, limit: usize) -> Result<Vec<NewsHeadline>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Api(format!("Finnhub API error {status}: {body}")));
        }

        let articles: Vec<NewsArticle> = response.json().await?;
        Ok(articles
            .into_iter()
            .take(limit)
            .map(NewsArticle::into_headline)
            .collect())
    }
}
