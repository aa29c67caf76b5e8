//! # Balance Reconciliation
//!
//! The three engine operations: carry the previous day's closing balance
//! forward, recompute the derived totals, and persist a day's summary.

use chrono::NaiveDate;
use shared::{DailySummary, SaveDailySummaryRequest};
use tracing::{error, info, warn};

use crate::errors::ApiError;
use crate::services::date_utils::format_api_date;
use crate::services::store::{DailySummaryStore, SavedSummary};

pub use shared::{recompute, BalanceTotals};

/// Where an opening balance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpeningBalanceSource {
    /// Closing balance of the previous day's stored record
    PriorRecord,
    /// The store has no record for the previous day
    NoPriorRecord,
    /// The previous day could not be read; the amount is a fallback
    LoadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningBalance {
    pub amount: f64,
    pub source: OpeningBalanceSource,
}

impl OpeningBalance {
    pub fn from_prior(amount: f64) -> Self {
        Self {
            amount,
            source: OpeningBalanceSource::PriorRecord,
        }
    }

    pub fn none() -> Self {
        Self {
            amount: 0.0,
            source: OpeningBalanceSource::NoPriorRecord,
        }
    }

    pub fn failed() -> Self {
        Self {
            amount: 0.0,
            source: OpeningBalanceSource::LoadFailed,
        }
    }

    /// True when the amount is a zero fallback after a failed read
    pub fn is_fallback(&self) -> bool {
        self.source == OpeningBalanceSource::LoadFailed
    }
}

/// Opening balance for `date`: the closing balance stored for the day before.
///
/// Never fails. A missing record or a failed read both yield 0; the source
/// tells them apart and failures are logged.
pub async fn load_opening_balance<S>(store: &S, date: NaiveDate) -> OpeningBalance
where
    S: DailySummaryStore + ?Sized,
{
    let Some(prior_date) = date.pred_opt() else {
        return OpeningBalance::none();
    };

    match store.get_daily_summary(prior_date).await {
        Ok(Some(prior)) => OpeningBalance::from_prior(prior.closing_balance),
        Ok(None) => {
            info!("No daily summary for {}, opening balance is 0", format_api_date(prior_date));
            OpeningBalance::none()
        }
        Err(e) => {
            warn!(
                "Failed to load daily summary for {}, opening balance defaults to 0: {}",
                format_api_date(prior_date),
                e
            );
            OpeningBalance::failed()
        }
    }
}

/// Upsert a day's summary.
///
/// With `expected_revision` set the store rejects the write if the record
/// changed since it was read.
pub async fn save_summary<S>(store: &S, summary: &DailySummary, expected_revision: Option<i64>) -> Result<SavedSummary, ApiError>
where
    S: DailySummaryStore + ?Sized,
{
    let request = SaveDailySummaryRequest::from_summary(summary, expected_revision);
    match store.save_daily_summary(&request).await {
        Ok(saved) => {
            info!(
                "Saved daily summary for {} (closing balance {}, {})",
                format_api_date(summary.date),
                saved.summary.closing_balance,
                if saved.created { "created" } else { "replaced" }
            );
            Ok(saved)
        }
        Err(e) => {
            error!("Failed to save daily summary for {}: {}", format_api_date(summary.date), e);
            Err(e)
        }
    }
}
