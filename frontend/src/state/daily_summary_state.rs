//! # Daily Summary State
//!
//! Client-held reconciliation state for the selected date, advanced only by
//! [`reduce`]. Every event that changes an input recomputes the derived
//! totals in the same step, so the state never shows totals that disagree
//! with its inputs.
//!
//! Events carry the date they belong to. An event for any date other than
//! the selected one is a late response for a previous selection and is
//! ignored.

use chrono::NaiveDate;
use shared::{recompute, DailySummary};

use crate::reconciliation::{OpeningBalance, OpeningBalanceSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    LoadingOpeningBalance,
    Ready,
    Saving,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    /// Inputs differ from what was last saved (or nothing was saved yet)
    Unsaved,
    Saved,
    /// Last save failed; the inputs are retained for a retry
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationState {
    pub phase: Phase,
    pub date: Option<NaiveDate>,
    pub opening_balance: f64,
    pub opening_source: Option<OpeningBalanceSource>,
    pub daily_income: f64,
    pub total_balance: f64,
    pub daily_expenses: f64,
    pub closing_balance: f64,
    /// Revision of the stored record for `date`; `Some(0)` when the store has none
    pub revision: Option<i64>,
    /// Set once the operator edits expenses for the selected date
    pub expenses_edited: bool,
    pub save_status: SaveStatus,
}

impl Default for ReconciliationState {
    fn default() -> Self {
        Self {
            phase: Phase::Uninitialized,
            date: None,
            opening_balance: 0.0,
            opening_source: None,
            daily_income: 0.0,
            total_balance: 0.0,
            daily_expenses: 0.0,
            closing_balance: 0.0,
            revision: None,
            expenses_edited: false,
            save_status: SaveStatus::Unsaved,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationEvent {
    DateSelected(NaiveDate),
    OpeningBalanceLoaded { date: NaiveDate, opening: OpeningBalance },
    /// Result of reading the selected date's own record
    SavedRecordLoaded { date: NaiveDate, record: Option<DailySummary> },
    IncomeChanged { date: NaiveDate, amount: f64 },
    ExpenseChanged { date: NaiveDate, amount: f64 },
    SaveRequested { date: NaiveDate },
    SaveSucceeded { date: NaiveDate, summary: DailySummary },
    SaveFailed { date: NaiveDate, message: String },
}

impl ReconciliationEvent {
    fn date(&self) -> NaiveDate {
        match self {
            ReconciliationEvent::DateSelected(date) => *date,
            ReconciliationEvent::OpeningBalanceLoaded { date, .. }
            | ReconciliationEvent::SavedRecordLoaded { date, .. }
            | ReconciliationEvent::IncomeChanged { date, .. }
            | ReconciliationEvent::ExpenseChanged { date, .. }
            | ReconciliationEvent::SaveRequested { date }
            | ReconciliationEvent::SaveSucceeded { date, .. }
            | ReconciliationEvent::SaveFailed { date, .. } => *date,
        }
    }
}

impl ReconciliationState {
    /// The record this state would save
    pub fn to_summary(&self) -> Option<DailySummary> {
        let date = self.date?;
        Some(DailySummary::from_inputs(
            date,
            self.opening_balance,
            self.daily_income,
            self.daily_expenses,
        ))
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    fn recompute_totals(&mut self) {
        let totals = recompute(self.opening_balance, self.daily_income, self.daily_expenses);
        self.total_balance = totals.total_balance;
        self.closing_balance = totals.closing_balance;
    }

    fn inputs_match(&self, summary: &DailySummary) -> bool {
        self.opening_balance == summary.opening_balance
            && self.daily_income == summary.daily_income
            && self.daily_expenses == summary.daily_expenses
    }
}

/// Advance the state by one event
pub fn reduce(mut state: ReconciliationState, event: ReconciliationEvent) -> ReconciliationState {
    if let ReconciliationEvent::DateSelected(date) = event {
        // Edits for the previous date are discarded
        return ReconciliationState {
            phase: Phase::LoadingOpeningBalance,
            date: Some(date),
            ..ReconciliationState::default()
        };
    }

    if state.date != Some(event.date()) {
        return state;
    }

    match event {
        ReconciliationEvent::DateSelected(_) => {}
        ReconciliationEvent::OpeningBalanceLoaded { opening, .. } => {
            state.opening_balance = opening.amount;
            state.opening_source = Some(opening.source);
            if state.phase == Phase::LoadingOpeningBalance {
                state.phase = Phase::Ready;
            }
            state.recompute_totals();
        }
        ReconciliationEvent::SavedRecordLoaded { record, .. } => match record {
            Some(record) => {
                state.revision = Some(record.revision.unwrap_or(0));
                if !state.expenses_edited {
                    state.daily_expenses = record.daily_expenses;
                    state.recompute_totals();
                }
            }
            None => state.revision = Some(0),
        },
        ReconciliationEvent::IncomeChanged { amount, .. } => {
            if state.daily_income != amount {
                state.daily_income = amount;
                state.save_status = SaveStatus::Unsaved;
                state.recompute_totals();
            }
        }
        ReconciliationEvent::ExpenseChanged { amount, .. } => {
            state.expenses_edited = true;
            if state.daily_expenses != amount {
                state.daily_expenses = amount;
                state.save_status = SaveStatus::Unsaved;
                state.recompute_totals();
            }
        }
        ReconciliationEvent::SaveRequested { .. } => {
            if state.phase == Phase::Ready {
                state.phase = Phase::Saving;
            }
        }
        ReconciliationEvent::SaveSucceeded { summary, .. } => {
            state.phase = Phase::Ready;
            state.revision = summary.revision.or(state.revision);
            state.save_status = if state.inputs_match(&summary) {
                SaveStatus::Saved
            } else {
                SaveStatus::Unsaved
            };
        }
        ReconciliationEvent::SaveFailed { message, .. } => {
            state.phase = Phase::Ready;
            state.save_status = SaveStatus::Failed(message);
        }
    }

    state
}
