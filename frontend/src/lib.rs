//! Client side of the cash ledger dashboard: the daily statement of bookings
//! and the balance reconciliation that carries each day's closing balance
//! into the next day's opening balance.

pub mod config;
pub mod controllers;
pub mod errors;
pub mod reconciliation;
pub mod services;
pub mod state;
pub mod statement;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::ClientConfig;
pub use controllers::{DailyStatementController, DailySummaryController};
pub use errors::{ApiError, ControllerError};
pub use reconciliation::{load_opening_balance, recompute, save_summary, OpeningBalance, OpeningBalanceSource};
pub use services::{ApiClient, Session, SessionContext};
