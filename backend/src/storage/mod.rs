//! # Storage Module
//!
//! Persistence for the daily summary store. The domain layer only sees the
//! [`DailySummaryStorage`] trait; the SQLite repository is the implementation
//! wired up at startup.

pub mod connection;
pub mod repositories;
pub mod traits;

pub use connection::DbConnection;
pub use repositories::DailySummaryRepository;
pub use traits::{DailySummaryStorage, UpsertOutcome};
