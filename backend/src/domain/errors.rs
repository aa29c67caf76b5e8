use thiserror::Error;

/// Errors produced by the daily summary domain
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("{0}")]
    Validation(String),
    #[error("Daily summary was modified by someone else (expected revision {expected}, found {actual})")]
    RevisionConflict { expected: i64, actual: i64 },
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
