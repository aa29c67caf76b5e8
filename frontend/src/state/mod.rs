pub mod daily_summary_state;
pub mod notifications;

pub use daily_summary_state::{reduce, Phase, ReconciliationEvent, ReconciliationState, SaveStatus};
pub use notifications::{Notification, NotificationLevel, Notifications};
