//! # Daily Statement Controller
//!
//! The dashboard's daily statement: the date's bookings and their payments,
//! with the reconciliation summary underneath. The statement's income is
//! pushed into the summary whenever it changes.

use chrono::NaiveDate;
use tracing::{error, info};

use crate::controllers::daily_summary_controller::DailySummaryController;
use crate::errors::ControllerError;
use crate::services::date_utils::{format_api_date, next_day, previous_day};
use crate::services::store::{BookingStore, DailySummaryStore, SavedSummary};
use crate::state::{Notification, Notifications};
use crate::statement::{payment_update, DailyStatement};

pub const PAYMENT_SUCCESS_MESSAGE: &str = "Payment updated successfully";
pub const PAYMENT_FAILURE_MESSAGE: &str = "Failed to update payment";
pub const FETCH_BOOKINGS_FAILURE_MESSAGE: &str = "Failed to fetch bookings";

pub struct DailyStatementController<B: BookingStore, S: DailySummaryStore> {
    bookings: B,
    summary: DailySummaryController<S>,
    statement: Option<DailyStatement>,
    notifications: Notifications,
}

impl<B: BookingStore, S: DailySummaryStore> DailyStatementController<B, S> {
    pub fn new(bookings: B, summary: DailySummaryController<S>) -> Self {
        Self {
            bookings,
            summary,
            statement: None,
            notifications: Notifications::new(),
        }
    }

    pub fn statement(&self) -> Option<&DailyStatement> {
        self.statement.as_ref()
    }

    pub fn summary(&self) -> &DailySummaryController<S> {
        &self.summary
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.summary.selected_date()
    }

    /// Statement and summary notifications, oldest first within each
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        let mut all = self.notifications.drain();
        all.extend(self.summary.take_notifications());
        all
    }

    pub async fn select_date(&mut self, date: NaiveDate) {
        self.summary.select_date(date).await;
        self.load_bookings(date).await;
    }

    pub async fn previous_day(&mut self) -> Result<(), ControllerError> {
        let date = self.selected_date().ok_or(ControllerError::NoDateSelected)?;
        self.select_date(previous_day(date)).await;
        Ok(())
    }

    pub async fn next_day(&mut self) -> Result<(), ControllerError> {
        let date = self.selected_date().ok_or(ControllerError::NoDateSelected)?;
        self.select_date(next_day(date)).await;
        Ok(())
    }

    /// Fetch the date's bookings; a failure leaves an empty statement
    async fn load_bookings(&mut self, date: NaiveDate) {
        let statement = match self.bookings.get_check_in_bookings(date).await {
            Ok(bookings) => DailyStatement::new(date, bookings),
            Err(e) => {
                error!("Failed to fetch bookings for {}: {}", format_api_date(date), e);
                self.notifications.push(Notification::error(FETCH_BOOKINGS_FAILURE_MESSAGE));
                DailyStatement::empty(date)
            }
        };
        self.statement = Some(statement);
        self.sync_income();
    }

    /// Push the statement's income into the summary when both refer to the selected date
    fn sync_income(&mut self) {
        let Some(statement) = &self.statement else {
            return;
        };
        if self.summary.selected_date() != Some(statement.date) {
            return;
        }
        let income = statement.daily_income();
        if let Err(e) = self.summary.set_daily_income(income) {
            error!("Failed to update daily income: {}", e);
        }
    }

    /// Edit the amount collected from one booking on the selected date
    pub fn set_booking_daily_amount(&mut self, booking_id: &str, amount: f64) -> Result<(), ControllerError> {
        let statement = self.statement.as_mut().ok_or(ControllerError::NoDateSelected)?;
        let amount = if amount.is_finite() { amount } else { 0.0 };
        if !statement.set_daily_amount(booking_id, amount) {
            return Err(ControllerError::UnknownBooking(booking_id.to_string()));
        }
        self.sync_income();
        Ok(())
    }

    pub fn set_daily_expenses(&mut self, amount: f64) -> Result<(), ControllerError> {
        self.summary.set_daily_expenses(amount)
    }

    pub async fn save_summary(&mut self) -> Result<SavedSummary, ControllerError> {
        self.summary.save().await
    }

    /// Record the edited daily amount as a payment on the booking, then reload the bookings
    pub async fn update_payment(&mut self, booking_id: &str) -> Result<(), ControllerError> {
        let statement = self.statement.as_ref().ok_or(ControllerError::NoDateSelected)?;
        let row = statement
            .row(booking_id)
            .ok_or_else(|| ControllerError::UnknownBooking(booking_id.to_string()))?;
        let date = statement.date;
        let request = payment_update(&row.booking, row.daily_amount, date);

        match self.bookings.update_booking_payment(booking_id, &request).await {
            Ok(()) => {
                info!("Recorded payment of {} for booking {}", request.daily_amount, booking_id);
                self.notifications.push(Notification::success(PAYMENT_SUCCESS_MESSAGE));
                self.load_bookings(date).await;
                Ok(())
            }
            Err(e) => {
                error!("Failed to update payment for booking {}: {}", booking_id, e);
                self.notifications.push(Notification::error(PAYMENT_FAILURE_MESSAGE));
                Err(e.into())
            }
        }
    }
}
