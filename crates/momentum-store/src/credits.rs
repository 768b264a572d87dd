//! Quota ledger: renewable, bounded, per-user request allowance
//!
//! Renewal is lazy. There is no background scheduler; every
//! credit-sensitive operation first evaluates the renewal policy against
//! the stored `last_reset` timestamp. Consumption is a single conditional
//! UPDATE so concurrent attempts for one user can never over-spend, even
//! across process instances sharing the store.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::Result;
use crate::models::{CreditOutcome, CreditsInfo, MAX_CREDITS};
use crate::store::Store;

/// Hours of wall-clock time between renewals
///
/// Elapsed-time semantics, not calendar-day boundaries: a user who spent
/// their last credit at 23:50 renews 24 hours later, not at midnight.
pub const RESET_INTERVAL_HOURS: i64 = 24;

fn reset_interval() -> Duration {
    Duration::hours(RESET_INTERVAL_HOURS)
}

/// Whether the renewal policy is due for a user last evaluated at `last_reset`
///
/// The authoritative check is the SQL guard in `check_and_renew_credits`;
/// this mirror of it exists to pin the interval semantics in unit tests.
pub(crate) fn renewal_due(last_reset: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - last_reset >= reset_interval()
}

/// When the next renewal becomes due
pub fn next_reset(last_reset: DateTime<Utc>) -> DateTime<Utc> {
    last_reset + reset_interval()
}

impl Store {
    /// Evaluate the renewal policy for one user
    ///
    /// A single guarded statement covers both renewal branches: because
    /// `credits <= MAX_CREDITS` holds at rest, topping an under-max user up
    /// and refreshing the timer of an at-max user both write
    /// `credits = MAX_CREDITS`. The `last_reset` guard makes the statement
    /// idempotent within a window and safe against concurrent evaluation;
    /// no credit is ever banked across windows.
    pub async fn check_and_renew_credits(&self, chat_id: i64) -> Result<()> {
        let now = Utc::now();
        let cutoff = now - reset_interval();
        let result = sqlx::query(
            "UPDATE users SET credits = $1, last_reset = $2, updated_at = $2 \
             WHERE chat_id = $3 AND last_reset <= $4",
        )
        .bind(MAX_CREDITS)
        .bind(now)
        .bind(chat_id)
        .bind(cutoff)
        .execute(self.pool())
        .await?;

        if result.rows_affected() > 0 {
            debug!(chat_id, "credits renewed");
        }
        Ok(())
    }

    /// Fresh balance after renewal; `0` for unknown users
    ///
    /// Never creates a record.
    pub async fn get_user_credits(&self, chat_id: i64) -> Result<i32> {
        self.check_and_renew_credits(chat_id).await?;
        let credits = sqlx::query_scalar::<_, i32>("SELECT credits FROM users WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(credits.unwrap_or(0))
    }

    /// Balance plus renewal timing after renewal
    ///
    /// Unknown users get a synthetic zero-balance view anchored at "now";
    /// nothing is persisted for them.
    pub async fn get_credits_info(&self, chat_id: i64) -> Result<CreditsInfo> {
        self.check_and_renew_credits(chat_id).await?;
        let row = sqlx::query_as::<_, (i32, DateTime<Utc>)>(
            "SELECT credits, last_reset FROM users WHERE chat_id = $1",
        )
        .bind(chat_id)
        .fetch_optional(self.pool())
        .await?;

        let info = match row {
            Some((credits, last_reset)) => CreditsInfo {
                credits,
                last_reset,
                next_reset: next_reset(last_reset),
            },
            None => {
                let now = Utc::now();
                CreditsInfo {
                    credits: 0,
                    last_reset: now,
                    next_reset: next_reset(now),
                }
            }
        };
        Ok(info)
    }

    /// Attempt to consume exactly one credit
    ///
    /// The decrement is guarded in the same statement (`credits > 0`) and
    /// the new balance comes back via RETURNING, so two concurrent calls
    /// for the same user with one credit left resolve to one grant and one
    /// denial. Unknown users and exhausted users are both denied.
    pub async fn use_credit(&self, chat_id: i64) -> Result<CreditOutcome> {
        self.check_and_renew_credits(chat_id).await?;
        let remaining = sqlx::query_scalar::<_, i32>(
            "UPDATE users SET credits = credits - 1, updated_at = $1 \
             WHERE chat_id = $2 AND credits > 0 \
             RETURNING credits",
        )
        .bind(Utc::now())
        .bind(chat_id)
        .fetch_optional(self.pool())
        .await?;

        let outcome = match remaining {
            Some(remaining) => CreditOutcome::granted(remaining),
            None => CreditOutcome::denied(),
        };
        debug!(chat_id, granted = outcome.granted, remaining = outcome.remaining, "use_credit");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renewal_due_after_full_day() {
        let now = Utc::now();
        assert!(renewal_due(now - Duration::hours(25), now));
        assert!(renewal_due(now - Duration::hours(24), now));
        assert!(!renewal_due(now - Duration::hours(23), now));
        assert!(!renewal_due(now, now));
    }

    #[test]
    fn test_renewal_is_wall_clock_not_calendar() {
        // Ten minutes before midnight plus one hour crosses a calendar-day
        // boundary but must not trigger renewal.
        let last_reset = "2026-08-25T23:50:00Z".parse::<DateTime<Utc>>().unwrap();
        let shortly_after = "2026-08-26T00:50:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(!renewal_due(last_reset, shortly_after));

        let next_day = "2026-08-26T23:50:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(renewal_due(last_reset, next_day));
    }

    #[test]
    fn test_next_reset() {
        let last_reset = "2026-08-25T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let expected = "2026-08-26T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(next_reset(last_reset), expected);
    }
}
