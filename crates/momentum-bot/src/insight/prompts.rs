//! Prompt assembly for the insight model

use std::fmt::Write as _;

use crate::market::snapshot::{NewsHeadline, StockSnapshot};
use crate::validation::format_large_number;

fn push_metric(out: &mut String, label: &str, value: Option<f64>) {
    match value {
        Some(v) => {
            let _ = writeln!(out, "- {label}: {v:.2}");
        }
        None => {
            let _ = writeln!(out, "- {label}: Unknown");
        }
    }
}

/// Build the stock analysis prompt from a snapshot
///
/// Sections mirror the order a human analyst would read them: company
/// profile, financial metrics, recent indicator rows, then headlines.
pub fn build_stock_analysis_prompt(snapshot: &StockSnapshot) -> String {
    let mut prompt = String::new();
    let symbol = &snapshot.symbol;

    let _ = writeln!(
        prompt,
        "You are a seasoned equity analyst. Analyze the stock {symbol} using the data below \
         and give a clear, balanced assessment covering trend, momentum, valuation and risks. \
         Finish with a short outlook. Do not give personalized financial advice."
    );

    let _ = writeln!(prompt, "\n## Company");
    let company = &snapshot.company;
    let _ = writeln!(
        prompt,
        "- Name: {}",
        company.name.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(
        prompt,
        "- Exchange: {}",
        company.exchange.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(
        prompt,
        "- Sector: {}",
        company.sector.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(
        prompt,
        "- Industry: {}",
        company.industry.as_deref().unwrap_or("Unknown")
    );

    let _ = writeln!(prompt, "\n## Financials");
    let metrics = &snapshot.metrics;
    push_metric(&mut prompt, "Current price", metrics.current_price);
    let _ = writeln!(
        prompt,
        "- Market cap: {}",
        format_large_number(metrics.market_cap)
    );
    push_metric(&mut prompt, "P/E ratio", metrics.pe_ratio);
    push_metric(&mut prompt, "EPS", metrics.eps);
    push_metric(&mut prompt, "Dividend yield", metrics.dividend_yield);
    push_metric(&mut prompt, "Profit margin", metrics.profit_margin);
    push_metric(&mut prompt, "Operating margin", metrics.operating_margin);
    push_metric(&mut prompt, "Return on equity", metrics.return_on_equity);
    push_metric(&mut prompt, "Book value", metrics.book_value);
    push_metric(&mut prompt, "Analyst target", metrics.analyst_target);

    let _ = writeln!(
        prompt,
        "\n## Technical indicators (last {} sessions)",
        snapshot.indicators.len()
    );
    let _ = writeln!(
        prompt,
        "date | close | SMA50 | SMA200 | MACD | signal | RSI | BB upper | BB lower | ATR | OBV | ROC10"
    );
    let closes: std::collections::HashMap<_, _> = snapshot
        .history
        .iter()
        .map(|p| (p.timestamp.date_naive(), p.close))
        .collect();
    for row in &snapshot.indicators {
        let date = row.timestamp.date_naive();
        let close = closes
            .get(&date)
            .map_or_else(|| "-".to_string(), |c| format!("{c:.2}"));
        let roc = row
            .roc_10
            .map_or_else(|| "-".to_string(), |r| format!("{r:.2}"));
        let _ = writeln!(
            prompt,
            "{date} | {close} | {:.2} | {:.2} | {:.3} | {:.3} | {:.1} | {:.2} | {:.2} | {:.2} | {:.0} | {roc}",
            row.sma_50,
            row.sma_200,
            row.macd,
            row.macd_signal,
            row.rsi,
            row.bb_upper,
            row.bb_lower,
            row.atr,
            row.obv,
        );
    }

    if !snapshot.headlines.is_empty() {
        let _ = writeln!(prompt, "\n## Recent headlines");
        for headline in &snapshot.headlines {
            let _ = writeln!(
                prompt,
                "- {} ({})",
                headline.title,
                headline.source.as_deref().unwrap_or("unknown source")
            );
        }
    }

    prompt
}

/// Build the market news digest prompt
pub fn build_news_summary_prompt(headlines: &[NewsHeadline]) -> String {
    let mut prompt = String::from(
        "You are a financial news editor. Summarize today's market mood in a few short \
         paragraphs based on the headlines below. Group related stories and note the \
         overall sentiment.\n\n## Headlines\n",
    );
    for headline in headlines {
        let _ = writeln!(
            prompt,
            "- {} ({})",
            headline.title,
            headline.source.as_deref().unwrap_or("unknown source")
        );
        if let Some(summary) = &headline.summary {
            let _ = writeln!(prompt, "  {summary}");
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::snapshot::{CompanyProfile, FinancialMetrics, StockSnapshot};

    fn minimal_snapshot() -> StockSnapshot {
        StockSnapshot {
            symbol: "AAPL".to_string(),
            company: CompanyProfile {
                name: Some("Apple Inc".to_string()),
                ..CompanyProfile::default()
            },
            metrics: FinancialMetrics {
                current_price: Some(231.5),
                market_cap: Some(3.4e12),
                ..FinancialMetrics::default()
            },
            history: Vec::new(),
            indicators: Vec::new(),
            headlines: Vec::new(),
        }
    }

    #[test]
    fn test_analysis_prompt_contains_key_sections() {
        let prompt = build_stock_analysis_prompt(&minimal_snapshot());
        assert!(prompt.contains("AAPL"));
        assert!(prompt.contains("Apple Inc"));
        assert!(prompt.contains("## Financials"));
        assert!(prompt.contains("$3400.00B"));
        assert!(prompt.contains("- P/E ratio: Unknown"));
        // No headlines section when the list is empty
        assert!(!prompt.contains("## Recent headlines"));
    }

    #[test]
    fn test_news_prompt_lists_headlines() {
        let headlines = vec![NewsHeadline {
            title: "Fed holds rates".to_string(),
            source: Some("Reuters".to_string()),
            url: None,
            summary: Some("No change expected until December.".to_string()),
            published_at: None,
        }];
        let prompt = build_news_summary_prompt(&headlines);
        assert!(prompt.contains("Fed holds rates"));
        assert!(prompt.contains("Reuters"));
        assert!(prompt.contains("No change expected"));
    }
}
