//! Ticker validation and chat-message formatting helpers

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{BotError, Result};

const MAX_TICKER_LEN: usize = 10;

/// Characters that need escaping in Telegram MarkdownV2
const MARKDOWN_SPECIAL: [char; 17] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
];

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9.\-]+$").expect("valid ticker pattern"))
}

/// Validate a user-supplied ticker symbol, returning the normalized form
pub fn validate_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Err(BotError::InvalidTicker(
            "Ticker symbol cannot be empty".to_string(),
        ));
    }
    if ticker.len() > MAX_TICKER_LEN {
        return Err(BotError::InvalidTicker(
            "Ticker symbol is too long (max 10 characters)".to_string(),
        ));
    }
    if !ticker_pattern().is_match(ticker) {
        return Err(BotError::InvalidTicker(
            "Ticker contains invalid characters".to_string(),
        ));
    }
    Ok(ticker.to_uppercase())
}

/// Escape special characters for Telegram MarkdownV2
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if MARKDOWN_SPECIAL.contains(&ch) || ch == '!' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Format a dollar amount with B/M suffixes for prompt text
pub fn format_large_number(number: Option<f64>) -> String {
    let Some(number) = number else {
        return "Unknown".to_string();
    };
    if number >= 1_000_000_000.0 {
        format!("${:.2}B", number / 1_000_000_000.0)
    } else if number >= 1_000_000.0 {
        format!("${:.2}M", number / 1_000_000.0)
    } else {
        format!("${number:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tickers() {
        assert_eq!(validate_ticker("aapl").unwrap(), "AAPL");
        assert_eq!(validate_ticker(" BRK.B ").unwrap(), "BRK.B");
        assert_eq!(validate_ticker("RDS-A").unwrap(), "RDS-A");
    }

    #[test]
    fn test_invalid_tickers() {
        assert!(validate_ticker("").is_err());
        assert!(validate_ticker("   ").is_err());
        assert!(validate_ticker("TOOLONGTICKER").is_err());
        assert!(validate_ticker("AA PL").is_err());
        assert!(validate_ticker("AAPL$").is_err());
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Analyzing AAPL"), "Analyzing AAPL");
        assert_eq!(escape_markdown("a.b-c!"), "a\\.b\\-c\\!");
        assert_eq!(escape_markdown("*bold*"), "\\*bold\\*");
    }

    #[test]
    fn test_format_large_number() {
        assert_eq!(format_large_number(None), "Unknown");
        assert_eq!(format_large_number(Some(2_500_000_000.0)), "$2.50B");
        assert_eq!(format_large_number(Some(12_300_000.0)), "$12.30M");
        assert_eq!(format_large_number(Some(1234.5)), "$1234.50");
    }
}
