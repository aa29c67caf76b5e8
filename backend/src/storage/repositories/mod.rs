// Repository modules
pub mod daily_summary_repository;

// Re-export repository types
pub use daily_summary_repository::DailySummaryRepository;
