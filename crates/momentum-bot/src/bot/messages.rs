//! Canned reply texts and keyboards
//!
//! All user-visible copy lives here so the orchestrator reads as control
//! flow, not string assembly.

use chrono::Utc;
use momentum_store::{CreditsInfo, MAX_CREDITS};

use crate::telegram::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const CB_ANALYZE: &str = "analyze_stock";
pub const CB_CREDITS: &str = "check_credits";
pub const CB_NEWS: &str = "market_news";
pub const CB_ABOUT: &str = "about_bot";
pub const CB_HOME: &str = "go_home";

/// Main menu shown on /start and go_home
pub fn home_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::rows(vec![
        InlineKeyboardButton::new("📊 Analyze Stock", CB_ANALYZE),
        InlineKeyboardButton::new("📰 Market News", CB_NEWS),
        InlineKeyboardButton::new("💳 My Credits", CB_CREDITS),
        InlineKeyboardButton::new("ℹ️ About", CB_ABOUT),
    ])
}

/// Single back-to-menu button attached to terminal replies
pub fn home_button() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::rows(vec![InlineKeyboardButton::new("🏠 Home", CB_HOME)])
}

pub fn welcome_text(first_name: Option<&str>) -> String {
    let name = first_name.unwrap_or("there");
    format!(
        "👋 Hi {name}! I'm Momentum, your AI stock analysis assistant.\n\n\
         I can analyze any stock for you using price history, technical \
         indicators, fundamentals and recent news, or summarize today's \
         market headlines.\n\n\
         Each analysis uses one credit. You get {MAX_CREDITS} credits every \
         24 hours. Pick an option below to get started."
    )
}

pub fn about_text() -> String {
    format!(
        "ℹ️ About Momentum\n\n\
         Momentum combines a year of price history, technical indicators \
         (SMA, MACD, RSI, Bollinger Bands and more), company fundamentals \
         and recent headlines, then asks an AI model for a balanced read.\n\n\
         You get {MAX_CREDITS} credits every 24 hours. Analysis is for \
         information only and is not financial advice."
    )
}

/// Remaining wait until a renewal instant, as "Xh Ym"
pub fn format_countdown(info: &CreditsInfo) -> String {
    let remaining = info.next_reset - Utc::now();
    let minutes = remaining.num_minutes();
    if minutes <= 0 {
        return "less than a minute".to_string();
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}

fn credits_emoji(credits: i32) -> &'static str {
    if credits >= MAX_CREDITS {
        "🟢"
    } else if credits > 0 {
        "🟡"
    } else {
        "🔴"
    }
}

pub fn credits_text(info: &CreditsInfo) -> String {
    let emoji = credits_emoji(info.credits);
    if info.credits >= MAX_CREDITS {
        format!(
            "{emoji} You have {}/{MAX_CREDITS} credits.\n\nYou're all topped up!",
            info.credits
        )
    } else {
        format!(
            "{emoji} You have {}/{MAX_CREDITS} credits.\n\nCredits renew in {}.",
            info.credits,
            format_countdown(info)
        )
    }
}

pub fn exhausted_text(info: &CreditsInfo) -> String {
    format!(
        "🔴 You've used all your credits for now.\n\nCredits renew in {}.",
        format_countdown(info)
    )
}

pub fn ticker_prompt() -> String {
    "Please enter the stock ticker symbol you'd like to analyze (e.g., AAPL):".to_string()
}

pub fn loading_text(symbol: &str) -> String {
    format!("🔍 Analyzing {symbol}... This may take a minute.")
}

pub fn news_loading_text() -> String {
    "📰 Gathering today's market headlines...".to_string()
}

pub fn analysis_failed_text(symbol: &str) -> String {
    format!(
        "⚠️ I couldn't fetch market data for {symbol}. A credit was used for this \
         attempt. Please check the symbol and try again."
    )
}

pub fn no_headlines_text() -> String {
    "📰 No market headlines are available right now. Please try again later. \
     No credit was used."
        .to_string()
}

pub fn generic_error_text() -> String {
    "⚠️ Something went wrong on our side. Please try again.".to_string()
}

pub fn idle_hint_text() -> String {
    "I didn't catch that. Use the menu below to analyze a stock or check \
     your credits."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn info(credits: i32, renew_in_minutes: i64) -> CreditsInfo {
        let now = Utc::now();
        CreditsInfo {
            credits,
            last_reset: now,
            next_reset: now + Duration::minutes(renew_in_minutes),
        }
    }

    #[test]
    fn test_countdown_formatting() {
        assert_eq!(format_countdown(&info(0, 150)), "2h 30m");
        assert_eq!(format_countdown(&info(0, -5)), "less than a minute");
    }

    #[test]
    fn test_credits_text_variants() {
        assert!(credits_text(&info(3, 600)).starts_with("🟢"));
        assert!(credits_text(&info(1, 600)).starts_with("🟡"));
        assert!(credits_text(&info(0, 600)).starts_with("🔴"));
        assert!(credits_text(&info(3, 600)).contains("topped up"));
        assert!(credits_text(&info(1, 600)).contains("renew in"));
    }

    #[test]
    fn test_home_keyboard_layout() {
        let markup = home_keyboard();
        assert_eq!(markup.inline_keyboard.len(), 4);
        assert_eq!(markup.inline_keyboard[0][0].callback_data, CB_ANALYZE);
    }
}
