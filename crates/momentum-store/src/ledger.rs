//! The narrow surface the session orchestrator is allowed to use
//!
//! Exactly five operations: identity resolution, the three credit
//! operations and the audit log. Everything else on `Store` stays behind
//! this seam so chat handlers cannot bypass the quota policy.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CreditOutcome, CreditsInfo, User, UserProfile};
use crate::store::Store;

/// Credit-accounted user ledger
#[async_trait]
pub trait UserLedger: Send + Sync {
    /// Resolve a chat identity, refreshing profile fields on every contact
    async fn get_or_create_user(&self, chat_id: i64, profile: &UserProfile) -> Result<User>;

    /// Fresh balance after lazy renewal; `0` for unknown users
    async fn get_user_credits(&self, chat_id: i64) -> Result<i32>;

    /// Balance and renewal timing; synthetic view for unknown users
    async fn get_credits_info(&self, chat_id: i64) -> Result<CreditsInfo>;

    /// Atomically consume one credit, if any remain
    async fn use_credit(&self, chat_id: i64) -> Result<CreditOutcome>;

    /// Append one audit entry; call only after a successful `use_credit`
    async fn log_analysis(
        &self,
        user_id: i64,
        ticker_symbol: &str,
        external_job_id: &str,
    ) -> Result<i64>;
}

#[async_trait]
impl UserLedger for Store {
    async fn get_or_create_user(&self, chat_id: i64, profile: &UserProfile) -> Result<User> {
        Store::get_or_create_user(self, chat_id, profile).await
    }

    async fn get_user_credits(&self, chat_id: i64) -> Result<i32> {
        Store::get_user_credits(self, chat_id).await
    }

    async fn get_credits_info(&self, chat_id: i64) -> Result<CreditsInfo> {
        Store::get_credits_info(self, chat_id).await
    }

    async fn use_credit(&self, chat_id: i64) -> Result<CreditOutcome> {
        Store::use_credit(self, chat_id).await
    }

    async fn log_analysis(
        &self,
        user_id: i64,
        ticker_symbol: &str,
        external_job_id: &str,
    ) -> Result<i64> {
        Store::log_analysis(self, user_id, ticker_symbol, external_job_id).await
    }
}
