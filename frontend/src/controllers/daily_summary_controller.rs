//! # Daily Summary Controller
//!
//! Drives the reconciliation state for one selected date against a
//! [`DailySummaryStore`]: loads the carried-forward opening balance, accepts
//! income and expense edits, and saves the day's record.

use chrono::NaiveDate;
use shared::DailySummary;
use tracing::{info, warn};

use crate::errors::{ApiError, ControllerError};
use crate::reconciliation::{load_opening_balance, save_summary};
use crate::services::date_utils::{format_api_date, next_day, previous_day};
use crate::services::store::{DailySummaryStore, SavedSummary};
use crate::state::{reduce, Notification, Notifications, ReconciliationEvent, ReconciliationState};

pub const SAVE_SUCCESS_MESSAGE: &str = "Daily summary saved successfully";
pub const SAVE_FAILURE_MESSAGE: &str = "Failed to save daily summary";
pub const SAVE_CONFLICT_MESSAGE: &str = "Daily summary was changed elsewhere; reload the date before saving";
pub const OPENING_FALLBACK_MESSAGE: &str = "Could not load the previous day's closing balance; opening balance set to 0";

pub struct DailySummaryController<S: DailySummaryStore> {
    store: S,
    state: ReconciliationState,
    notifications: Notifications,
    optimistic_concurrency: bool,
}

impl<S: DailySummaryStore> DailySummaryController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: ReconciliationState::default(),
            notifications: Notifications::new(),
            optimistic_concurrency: false,
        }
    }

    /// Send the last-read revision with each save so concurrent edits are rejected
    pub fn with_optimistic_concurrency(mut self, enabled: bool) -> Self {
        self.optimistic_concurrency = enabled;
        self
    }

    pub fn state(&self) -> &ReconciliationState {
        &self.state
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.state.date
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    fn dispatch(&mut self, event: ReconciliationEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, event);
    }

    /// Select a date and load its opening balance and any saved record
    pub async fn select_date(&mut self, date: NaiveDate) {
        info!("Selecting daily summary date {}", format_api_date(date));
        self.dispatch(ReconciliationEvent::DateSelected(date));

        let opening = load_opening_balance(&self.store, date).await;
        if opening.is_fallback() {
            self.notifications.push(Notification::warning(OPENING_FALLBACK_MESSAGE));
        }
        self.dispatch(ReconciliationEvent::OpeningBalanceLoaded { date, opening });

        match self.store.get_daily_summary(date).await {
            Ok(record) => self.dispatch(ReconciliationEvent::SavedRecordLoaded { date, record }),
            Err(e) => warn!("Failed to load saved daily summary for {}: {}", format_api_date(date), e),
        }
    }

    /// Reload the selected date, discarding unsaved edits
    pub async fn reload(&mut self) -> Result<(), ControllerError> {
        let date = self.state.date.ok_or(ControllerError::NoDateSelected)?;
        self.select_date(date).await;
        Ok(())
    }

    pub async fn previous_day(&mut self) -> Result<(), ControllerError> {
        let date = self.state.date.ok_or(ControllerError::NoDateSelected)?;
        self.select_date(previous_day(date)).await;
        Ok(())
    }

    pub async fn next_day(&mut self) -> Result<(), ControllerError> {
        let date = self.state.date.ok_or(ControllerError::NoDateSelected)?;
        self.select_date(next_day(date)).await;
        Ok(())
    }

    /// Set the day's income; non-finite amounts count as 0
    pub fn set_daily_income(&mut self, amount: f64) -> Result<(), ControllerError> {
        let date = self.state.date.ok_or(ControllerError::NoDateSelected)?;
        self.dispatch(ReconciliationEvent::IncomeChanged {
            date,
            amount: finite_or_zero(amount),
        });
        Ok(())
    }

    /// Set the day's expenses; non-finite amounts count as 0
    pub fn set_daily_expenses(&mut self, amount: f64) -> Result<(), ControllerError> {
        let date = self.state.date.ok_or(ControllerError::NoDateSelected)?;
        self.dispatch(ReconciliationEvent::ExpenseChanged {
            date,
            amount: finite_or_zero(amount),
        });
        Ok(())
    }

    /// Save the current values for the selected date.
    ///
    /// The outcome is also queued as a notification. On failure the entered
    /// values stay in place and saving again retries.
    pub async fn save(&mut self) -> Result<SavedSummary, ControllerError> {
        let date = self.state.date.ok_or(ControllerError::NoDateSelected)?;
        if !self.state.is_ready() {
            return Err(ControllerError::NotReady);
        }
        let summary: DailySummary = self.state.to_summary().ok_or(ControllerError::NoDateSelected)?;
        let expected_revision = if self.optimistic_concurrency {
            Some(self.state.revision.unwrap_or(0))
        } else {
            None
        };

        self.dispatch(ReconciliationEvent::SaveRequested { date });
        match save_summary(&self.store, &summary, expected_revision).await {
            Ok(saved) => {
                self.notifications.push(Notification::success(SAVE_SUCCESS_MESSAGE));
                self.dispatch(ReconciliationEvent::SaveSucceeded {
                    date,
                    summary: saved.summary.clone(),
                });
                Ok(saved)
            }
            Err(e) => {
                let message = match &e {
                    ApiError::Conflict { .. } => SAVE_CONFLICT_MESSAGE,
                    _ => SAVE_FAILURE_MESSAGE,
                };
                self.notifications.push(Notification::error(message));
                self.dispatch(ReconciliationEvent::SaveFailed {
                    date,
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }
}

fn finite_or_zero(amount: f64) -> f64 {
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}
