//! AI insight generation
//!
//! The orchestrator only knows [`InsightGenerator`]; the Replicate-backed
//! implementation lives in [`replicate`]. Generation failures are reported
//! as an [`Insight`] carrying [`ERROR_JOB_ID`] so the caller can log the
//! attempt without special-casing errors.

pub mod prompts;
pub mod replicate;

use async_trait::async_trait;

use crate::error::Result;
use crate::market::snapshot::{NewsHeadline, StockSnapshot};

/// Sentinel job id recorded when generation failed after billing
pub const ERROR_JOB_ID: &str = "error_id";

/// The model's answer plus the provider-side job identifier
#[derive(Debug, Clone)]
pub struct Insight {
    pub text: String,
    pub job_id: String,
}

/// Turns market data into prose
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Full analysis of one stock snapshot
    async fn generate_analysis(&self, snapshot: &StockSnapshot) -> Result<Insight>;

    /// Short digest of the current market headlines
    async fn summarize_news(&self, headlines: &[NewsHeadline]) -> Result<Insight>;
}

