//! In-memory stores and fixtures for unit tests

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{Booking, CheckInBookings, DailySummary, InvoiceDetail, SaveDailySummaryRequest, UpdateBookingPaymentRequest};

use crate::errors::ApiError;
use crate::services::store::{BookingStore, DailySummaryStore, SavedSummary};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn booking(id: &str, total_bill: f64, total_paid: f64) -> Booking {
    Booking {
        id: id.to_string(),
        booking_no: format!("BK-{}", id),
        full_name: "Guest".to_string(),
        phone: String::new(),
        room_number_name: None,
        check_in_date: None,
        check_out_date: None,
        nights: None,
        total_bill,
        total_paid,
        advance_payment: 0.0,
        payment_method: None,
        status_id: None,
        daily_amount: 0.0,
        invoice_details: None,
    }
}

pub fn invoice_line(date: &str, daily_amount: f64, total_paid: f64) -> InvoiceDetail {
    InvoiceDetail {
        date: date.to_string(),
        daily_amount,
        total_paid,
    }
}

#[derive(Default)]
struct SummaryStoreState {
    records: BTreeMap<NaiveDate, DailySummary>,
    fail_reads: bool,
    fail_writes: bool,
    saves: Vec<SaveDailySummaryRequest>,
}

/// Daily summary store keeping records in memory, with revisions like the backend
#[derive(Clone, Default)]
pub struct MockSummaryStore {
    state: Arc<Mutex<SummaryStoreState>>,
}

impl MockSummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly (revision 1 unless set)
    pub fn insert(&self, mut summary: DailySummary) {
        summary.revision = Some(summary.revision.unwrap_or(1));
        self.state.lock().unwrap().records.insert(summary.date, summary);
    }

    pub fn get(&self, date: NaiveDate) -> Option<DailySummary> {
        self.state.lock().unwrap().records.get(&date).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    /// Every save request received, in order
    pub fn saves(&self) -> Vec<SaveDailySummaryRequest> {
        self.state.lock().unwrap().saves.clone()
    }
}

#[async_trait]
impl DailySummaryStore for MockSummaryStore {
    async fn get_daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, ApiError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        Ok(state.records.get(&date).cloned())
    }

    async fn save_daily_summary(&self, request: &SaveDailySummaryRequest) -> Result<SavedSummary, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.saves.push(request.clone());
        if state.fail_writes {
            return Err(ApiError::Server {
                status: 500,
                message: "database unavailable".to_string(),
            });
        }

        let current = state.records.get(&request.date).and_then(|r| r.revision).unwrap_or(0);
        if let Some(expected) = request.expected_revision {
            if expected != current {
                return Err(ApiError::Conflict {
                    message: format!("expected revision {} but found {}", expected, current),
                });
            }
        }

        let mut summary = request.clone().into_summary();
        summary.revision = Some(current + 1);
        state.records.insert(summary.date, summary.clone());
        Ok(SavedSummary {
            summary,
            created: current == 0,
        })
    }
}

#[derive(Default)]
struct BookingStoreState {
    bookings: HashMap<NaiveDate, CheckInBookings>,
    fail_reads: bool,
    fail_writes: bool,
    updates: Vec<(String, UpdateBookingPaymentRequest)>,
}

/// Booking store serving fixed listings per date and recording payment updates
#[derive(Clone, Default)]
pub struct MockBookingStore {
    state: Arc<Mutex<BookingStoreState>>,
}

impl MockBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bookings(&self, date: NaiveDate, bookings: CheckInBookings) {
        self.state.lock().unwrap().bookings.insert(date, bookings);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn updates(&self) -> Vec<(String, UpdateBookingPaymentRequest)> {
        self.state.lock().unwrap().updates.clone()
    }
}

#[async_trait]
impl BookingStore for MockBookingStore {
    async fn get_check_in_bookings(&self, date: NaiveDate) -> Result<CheckInBookings, ApiError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(ApiError::Timeout);
        }
        Ok(state.bookings.get(&date).cloned().unwrap_or_default())
    }

    async fn update_booking_payment(&self, booking_id: &str, request: &UpdateBookingPaymentRequest) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(ApiError::NotFound);
        }
        state.updates.push((booking_id.to_string(), request.clone()));
        Ok(())
    }
}
