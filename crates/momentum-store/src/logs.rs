//! Append-only audit trail of billed analysis requests

use tracing::debug;

use crate::error::Result;
use crate::store::Store;

impl Store {
    /// Record one billed analysis request
    ///
    /// Must only be called after a successful `use_credit` for the same
    /// user. Entries are never updated or deleted; failed generations are
    /// recorded with the generator's sentinel job id so operators can tell
    /// billed failures from billed successes.
    pub async fn log_analysis(
        &self,
        user_id: i64,
        ticker_symbol: &str,
        external_job_id: &str,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO analysis_logs (user_id, ticker_symbol, external_job_id) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(ticker_symbol)
        .bind(external_job_id)
        .fetch_one(self.pool())
        .await?;

        debug!(user_id, ticker_symbol, external_job_id, log_id = id, "analysis logged");
        Ok(id)
    }
}
