pub mod api;
pub mod date_utils;
pub mod session;
pub mod store;

pub use api::ApiClient;
pub use session::{Session, SessionContext};
pub use store::{BookingStore, DailySummaryStore, SavedSummary};
