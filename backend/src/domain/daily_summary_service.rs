//! Daily summary service.
//!
//! Validates and stores one reconciliation record per calendar date. Saving is
//! a full-replace upsert; with an expected revision it becomes a
//! compare-and-swap on the stored revision.

use std::sync::Arc;

use chrono::NaiveDate;
use shared::{ChainAuditResponse, DailySummary, DailySummaryRangeQuery, SaveDailySummaryRequest};
use tracing::{info, warn};

use crate::domain::chain_audit::audit_chain;
use crate::domain::errors::SummaryError;
use crate::storage::{DailySummaryStorage, UpsertOutcome};

/// Stored record plus whether the save created it
#[derive(Debug, Clone, PartialEq)]
pub struct SavedSummary {
    pub summary: DailySummary,
    pub created: bool,
}

#[derive(Clone)]
pub struct DailySummaryService {
    storage: Arc<dyn DailySummaryStorage>,
}

impl DailySummaryService {
    pub fn new(storage: Arc<dyn DailySummaryStorage>) -> Self {
        Self { storage }
    }

    /// Parse a `YYYY-MM-DD` path segment
    pub fn parse_date(raw: &str) -> Result<NaiveDate, SummaryError> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| SummaryError::InvalidDate(raw.to_string()))
    }

    pub async fn get_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, SummaryError> {
        Ok(self.storage.get_summary(date).await?)
    }

    pub async fn list_summaries(&self, query: &DailySummaryRangeQuery) -> Result<Vec<DailySummary>, SummaryError> {
        Self::validate_range(query)?;
        Ok(self.storage.list_summaries(query.from, query.to).await?)
    }

    /// Create or replace the record for the request's date
    pub async fn save_summary(&self, request: SaveDailySummaryRequest) -> Result<SavedSummary, SummaryError> {
        let expected_revision = request.expected_revision;
        let summary = request.into_summary();
        Self::validate_summary(&summary)?;

        info!(
            "Saving daily summary for {}: opening={:.2} income={:.2} expenses={:.2} closing={:.2}",
            summary.date, summary.opening_balance, summary.daily_income, summary.daily_expenses, summary.closing_balance
        );

        match self.storage.upsert_summary(&summary, expected_revision).await? {
            UpsertOutcome::Created(summary) => Ok(SavedSummary { summary, created: true }),
            UpsertOutcome::Replaced(summary) => Ok(SavedSummary { summary, created: false }),
            UpsertOutcome::RevisionMismatch { current } => {
                let expected = expected_revision.unwrap_or_default();
                warn!(
                    "Rejected save for {}: expected revision {}, stored revision {}",
                    summary.date, expected, current
                );
                Err(SummaryError::RevisionConflict { expected, actual: current })
            }
        }
    }

    /// Verify the opening -> closing chain for a date range.
    ///
    /// The day before `from` is loaded as well so the first day in range can be
    /// checked against its predecessor.
    pub async fn audit_chain(&self, query: &DailySummaryRangeQuery) -> Result<ChainAuditResponse, SummaryError> {
        Self::validate_range(query)?;
        let load_from = query.from.and_then(|d| d.pred_opt());
        let records = self.storage.list_summaries(load_from, query.to).await?;
        Ok(audit_chain(&records, query.from))
    }

    fn validate_range(query: &DailySummaryRangeQuery) -> Result<(), SummaryError> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(SummaryError::Validation(format!(
                    "Range start {} is after range end {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    fn validate_summary(summary: &DailySummary) -> Result<(), SummaryError> {
        let amounts = [
            ("openingBalance", summary.opening_balance),
            ("dailyIncome", summary.daily_income),
            ("totalBalance", summary.total_balance),
            ("dailyExpenses", summary.daily_expenses),
            ("closingBalance", summary.closing_balance),
        ];
        for (field, value) in amounts {
            if !value.is_finite() {
                return Err(SummaryError::Validation(format!("{} must be a finite number", field)));
            }
        }

        if !summary.is_consistent() {
            let expected = summary.expected_totals();
            return Err(SummaryError::Validation(format!(
                "Balances do not reconcile: expected totalBalance {:.2} and closingBalance {:.2}",
                expected.total_balance, expected.closing_balance
            )));
        }

        Ok(())
    }
}
