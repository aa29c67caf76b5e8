//! Traits for the remote stores the dashboard talks to.
//!
//! The controllers only depend on these, so tests run them against in-memory
//! fakes while the application wires in [`ApiClient`](super::api::ApiClient).

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{CheckInBookings, DailySummary, SaveDailySummaryRequest, UpdateBookingPaymentRequest};

use crate::errors::ApiError;

/// Record returned by a successful save
#[derive(Debug, Clone, PartialEq)]
pub struct SavedSummary {
    pub summary: DailySummary,
    /// True when the store created the record, false when it replaced one
    pub created: bool,
}

/// The daily summary store (`/daily-summary`)
#[async_trait]
pub trait DailySummaryStore: Send + Sync {
    /// Fetch the record for a date; `Ok(None)` when the store has none
    async fn get_daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, ApiError>;

    /// Create or fully replace the record for `request.date`
    async fn save_daily_summary(&self, request: &SaveDailySummaryRequest) -> Result<SavedSummary, ApiError>;
}

/// The booking service feeding the daily statement
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Bookings checked in on a date, as returned by the API (not yet de-duplicated)
    async fn get_check_in_bookings(&self, date: NaiveDate) -> Result<CheckInBookings, ApiError>;

    /// Record a payment against a booking
    async fn update_booking_payment(&self, booking_id: &str, request: &UpdateBookingPaymentRequest) -> Result<(), ApiError>;
}
