//! # Storage Traits
//!
//! Storage abstraction used by the domain layer so the daily summary store can
//! be backed by something other than SQLite without touching the services.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::DailySummary;

/// Result of writing a daily summary
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// No record existed for the date; the stored record is returned
    Created(DailySummary),
    /// An existing record was fully replaced
    Replaced(DailySummary),
    /// The caller's expected revision did not match; nothing was written
    RevisionMismatch { current: i64 },
}

/// Interface for daily summary persistence
#[async_trait]
pub trait DailySummaryStorage: Send + Sync {
    /// Retrieve the record for a date
    async fn get_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>>;

    /// List records in date order, both bounds inclusive
    async fn list_summaries(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<DailySummary>>;

    /// Create or fully replace the record for `summary.date`.
    ///
    /// With `expected_revision` set the write only happens when the stored
    /// revision equals it (a missing record counts as revision 0).
    async fn upsert_summary(&self, summary: &DailySummary, expected_revision: Option<i64>) -> Result<UpsertOutcome>;
}
