//! Persistent records for users and analysis logs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Maximum credit balance a user can hold; renewal tops up to this value
pub const MAX_CREDITS: i32 = 3;

/// Fallback locale when a chat platform reports no language code
pub const DEFAULT_LANGUAGE: &str = "en";

/// One record per chat identity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Surrogate key assigned by the store
    pub id: i64,
    /// External chat-platform identity, unique
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Remaining analysis allowance, `0..=MAX_CREDITS`
    pub credits: i32,
    pub language: String,
    /// Last time the renewal policy evaluated this user
    pub last_reset: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile attributes refreshed on every directory touch
///
/// All fields are optional; absent fields are left untouched on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language: Option<String>,
}

impl UserProfile {
    /// True when no field is present, i.e. an update would be a no-op
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.language.is_none()
    }
}

/// Balance snapshot returned by `get_credits_info`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreditsInfo {
    pub credits: i32,
    pub last_reset: DateTime<Utc>,
    pub next_reset: DateTime<Utc>,
}

/// Result of a consumption attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditOutcome {
    /// Whether one credit was deducted
    pub granted: bool,
    /// Balance after the attempt; `0` for unknown or exhausted users
    pub remaining: i32,
}

impl CreditOutcome {
    pub fn granted(remaining: i32) -> Self {
        Self {
            granted: true,
            remaining,
        }
    }

    pub fn denied() -> Self {
        Self {
            granted: false,
            remaining: 0,
        }
    }
}
