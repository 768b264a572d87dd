//! Durable user directory, quota ledger and request log for the Momentum bot
//!
//! This crate owns everything that must survive a restart:
//!
//! - `store`: the Postgres pool with liveness-checked acquisition, boot
//!   retry and embedded migrations
//! - `users`: get-or-create identity resolution with per-field profile
//!   refresh
//! - `credits`: the renewable credit allowance — lazy 24-hour renewal and
//!   race-safe single-statement consumption
//! - `logs`: the append-only analysis audit trail
//! - `ledger`: the five-operation trait chat handlers consume
//!
//! Credits are never cached in process; the store is the single source of
//! truth so several bot instances can share one database.

pub mod config;
pub mod credits;
pub mod error;
pub mod ledger;
pub mod models;
pub mod store;

mod logs;
mod users;

pub use config::StoreConfig;
pub use credits::{RESET_INTERVAL_HOURS, next_reset};
pub use error::{Result, StoreError};
pub use ledger::UserLedger;
pub use models::{CreditOutcome, CreditsInfo, DEFAULT_LANGUAGE, MAX_CREDITS, User, UserProfile};
pub use store::Store;
