//! # Domain Module
//!
//! Business rules of the daily summary store: record validation, the
//! create-or-replace save with its optional revision check, and verification
//! of the opening -> closing balance chain across days.

pub mod chain_audit;
pub mod daily_summary_service;
pub mod errors;

pub use chain_audit::audit_chain;
pub use daily_summary_service::{DailySummaryService, SavedSummary};
pub use errors::SummaryError;
