//! Alpha Vantage company fundamentals client

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{BotError, Result};
use crate::market::snapshot::{CompanyProfile, FinancialMetrics};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Raw `OVERVIEW` payload; Alpha Vantage serializes every metric as a string
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyOverview {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Exchange")]
    pub exchange: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<String>,
    #[serde(rename = "DividendYield")]
    pub dividend_yield: Option<String>,
    #[serde(rename = "ProfitMargin")]
    pub profit_margin: Option<String>,
    #[serde(rename = "OperatingMarginTTM")]
    pub operating_margin: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    pub return_on_equity: Option<String>,
    #[serde(rename = "BookValue")]
    pub book_value: Option<String>,
    #[serde(rename = "AnalystTargetPrice")]
    pub analyst_target: Option<String>,
}

/// Parse one Alpha Vantage metric; "None" and "-" mean unavailable
fn parse_metric(raw: Option<&String>) -> Option<f64> {
    let raw = raw?;
    if raw == "None" || raw == "-" || raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}

impl CompanyOverview {
    pub fn profile(&self) -> CompanyProfile {
        CompanyProfile {
            name: self.name.clone(),
            exchange: self.exchange.clone(),
            sector: self.sector.clone(),
            industry: self.industry.clone(),
            summary: self.description.clone(),
        }
    }

    /// Numeric metrics; `current_price` is filled in from the quote feed
    pub fn metrics(&self) -> FinancialMetrics {
        FinancialMetrics {
            current_price: None,
            market_cap: parse_metric(self.market_cap.as_ref()),
            pe_ratio: parse_metric(self.pe_ratio.as_ref()),
            eps: parse_metric(self.eps.as_ref()),
            dividend_yield: parse_metric(self.dividend_yield.as_ref()),
            profit_margin: parse_metric(self.profit_margin.as_ref()),
            operating_margin: parse_metric(self.operating_margin.as_ref()),
            return_on_equity: parse_metric(self.return_on_equity.as_ref()),
            book_value: parse_metric(self.book_value.as_ref()),
            analyst_target: parse_metric(self.analyst_target.as_ref()),
        }
    }
}

/// Client for the Alpha Vantage `OVERVIEW` endpoint
pub struct FundamentalsClient {
    client: Client,
    api_key: String,
}

impl FundamentalsClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
        }
    }

    /// Fetch the company overview for a symbol
    pub async fn get_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let mut params = HashMap::new();
        params.insert("function", "OVERVIEW");
        params.insert("symbol", symbol);
        params.insert("apikey", &self.api_key);

        let response = self.client.get(BASE_URL).query(&params).send().await?;
        let data: serde_json::Value = response.json().await?;

        if let Some(error) = data.get("Error Message") {
            return Err(BotError::MarketData {
                symbol: symbol.to_string(),
                reason: error.to_string(),
            });
        }
        if data.get("Note").is_some() {
            return Err(BotError::MarketData {
                symbol: symbol.to_string(),
                reason: "Alpha Vantage rate limit exceeded".to_string(),
            });
        }
        if data.as_object().is_none_or(serde_json::Map::is_empty) {
            return Err(BotError::MarketData {
                symbol: symbol.to_string(),
                reason: "symbol not found".to_string(),
            });
        }

        let overview: CompanyOverview = serde_json::from_value(data)?;
        Ok(overview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metric_filters_placeholders() {
        assert_eq!(parse_metric(Some(&"None".to_string())), None);
        assert_eq!(parse_metric(Some(&"-".to_string())), None);
        assert_eq!(parse_metric(Some(&String::new())), None);
        assert_eq!(parse_metric(None), None);
        assert_eq!(parse_metric(Some(&"12.5".to_string())), Some(12.5));
    }

    #[test]
    fn test_overview_deserialization() {
        let payload = serde_json::json!({
            "Name": "Apple Inc",
            "Sector": "TECHNOLOGY",
            "MarketCapitalization": "3000000000000",
            "PERatio": "29.1",
            "DividendYield": "0.0044",
            "AnalystTargetPrice": "None"
        });
        let overview: CompanyOverview = serde_json::from_value(payload).unwrap();

        let profile = overview.profile();
        assert_eq!(profile.name.as_deref(), Some("Apple Inc"));
        assert_eq!(profile.industry, None);

        let metrics = overview.metrics();
        assert_eq!(metrics.market_cap, Some(3_000_000_000_000.0));
        assert_eq!(metrics.pe_ratio, Some(29.1));
        assert_eq!(metrics.analyst_target, None);
    }
}
