//! Persistent store adapter
//!
//! Owns the process-wide connection pool. Connections are liveness-checked
//! before every acquisition, so callers never handle "not connected" as a
//! distinct error path; a dead connection is transparently replaced or the
//! operation fails with a store error.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};

use crate::config::StoreConfig;
use crate::error::Result;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_BACKOFF_STEP_SECS: u64 = 5;

/// Handle to the backing relational store
///
/// Cheap to clone; all clones share one pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Establish the connection pool
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .test_before_acquire(true)
            .connect(&config.connection_url())
            .await?;

        info!(target = %config.display_target(), "database connection established");
        Ok(Self { pool })
    }

    /// Connect with bounded retry, for process boot
    ///
    /// Attempt `n` waits `5 * n` seconds before retrying. After
    /// `max_attempts` failures the last error is returned and the caller
    /// is expected to exit.
    pub async fn connect_with_retry(config: &StoreConfig, max_attempts: u32) -> Result<Self> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match Self::connect(config).await {
                Ok(store) => return Ok(store),
                Err(err) if attempt < max_attempts => {
                    let wait = RETRY_BACKOFF_STEP_SECS * u64::from(attempt);
                    warn!(attempt, wait_secs = wait, "database connection failed: {err}");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                Err(err) => {
                    error!(attempt, "giving up on database connection: {err}");
                    return Err(err);
                }
            }
        }
    }

    /// Apply embedded schema migrations; idempotent
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!().run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    /// Shared connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Release all connections; safe to call more than once
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
