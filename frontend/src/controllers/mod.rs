pub mod daily_statement_controller;
pub mod daily_summary_controller;

pub use daily_statement_controller::DailyStatementController;
pub use daily_summary_controller::DailySummaryController;
