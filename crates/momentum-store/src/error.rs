//! Error types for store operations

use thiserror::Error;

/// Errors surfaced by the persistent store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query or connection failure from the backing database
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Invalid or missing store configuration
    #[error("store configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
