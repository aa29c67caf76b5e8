//! # Daily Statement
//!
//! Bookings checked in on a date, split into regular and unpaid sections,
//! with per-booking payment totals. The editable per-booking daily amounts
//! sum to the day's income.

use chrono::NaiveDate;
use shared::{Booking, CheckInBookings, UpdateBookingPaymentRequest};

use crate::services::date_utils::{day_of_timestamp, search_date_timestamp};

/// Payment totals of one booking across all its invoice lines
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CumulativeTotals {
    pub total_paid: f64,
    pub daily_amount: f64,
    pub due_amount: f64,
}

pub fn cumulative_totals(booking: &Booking) -> CumulativeTotals {
    let total_paid = match &booking.invoice_details {
        Some(details) => details.iter().map(|entry| entry.total_paid).sum(),
        None => booking.total_paid,
    };

    CumulativeTotals {
        total_paid,
        daily_amount: booking.daily_amount,
        due_amount: booking.total_bill - total_paid,
    }
}

/// Amount collected on `date`, from the invoice line dated that day (0 if none)
pub fn daily_amount_for(booking: &Booking, date: NaiveDate) -> f64 {
    booking
        .invoice_details
        .iter()
        .flatten()
        .find(|entry| day_of_timestamp(&entry.date) == Some(date))
        .map(|entry| entry.daily_amount)
        .unwrap_or(0.0)
}

/// Split the listing into (regular, unpaid), dropping unpaid entries that are also regular
pub fn split_sections(bookings: CheckInBookings) -> (Vec<Booking>, Vec<Booking>) {
    let CheckInBookings {
        regular_invoice,
        un_paid_invoice,
    } = bookings;

    let unpaid = un_paid_invoice
        .into_iter()
        .filter(|unpaid| !regular_invoice.iter().any(|regular| regular.id == unpaid.id))
        .collect();

    (regular_invoice, unpaid)
}

/// Footer totals of one statement section
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SectionTotals {
    pub total_bill: f64,
    pub total_paid: f64,
    pub daily_amount: f64,
    pub due_amount: f64,
}

impl SectionTotals {
    pub fn for_bookings<'a>(bookings: impl IntoIterator<Item = &'a Booking>, date: NaiveDate) -> Self {
        bookings.into_iter().fold(Self::default(), |acc, booking| {
            let totals = cumulative_totals(booking);
            Self {
                total_bill: acc.total_bill + booking.total_bill,
                total_paid: acc.total_paid + totals.total_paid,
                daily_amount: acc.daily_amount + daily_amount_for(booking, date),
                due_amount: acc.due_amount + totals.due_amount,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    pub booking: Booking,
    pub totals: CumulativeTotals,
    /// Amount collected on the statement date, editable by the operator
    pub daily_amount: f64,
}

impl StatementRow {
    fn new(booking: Booking, date: NaiveDate) -> Self {
        Self {
            totals: cumulative_totals(&booking),
            daily_amount: daily_amount_for(&booking, date),
            booking,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyStatement {
    pub date: NaiveDate,
    pub regular: Vec<StatementRow>,
    pub unpaid: Vec<StatementRow>,
}

impl DailyStatement {
    pub fn new(date: NaiveDate, bookings: CheckInBookings) -> Self {
        let (regular, unpaid) = split_sections(bookings);
        Self {
            date,
            regular: regular.into_iter().map(|b| StatementRow::new(b, date)).collect(),
            unpaid: unpaid.into_iter().map(|b| StatementRow::new(b, date)).collect(),
        }
    }

    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            regular: Vec::new(),
            unpaid: Vec::new(),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &StatementRow> {
        self.regular.iter().chain(self.unpaid.iter())
    }

    pub fn row(&self, booking_id: &str) -> Option<&StatementRow> {
        self.rows().find(|row| row.booking.id == booking_id)
    }

    /// Totals use each booking's recorded amount for the date, not the edited one
    pub fn regular_totals(&self) -> SectionTotals {
        SectionTotals::for_bookings(self.regular.iter().map(|row| &row.booking), self.date)
    }

    pub fn unpaid_totals(&self) -> SectionTotals {
        SectionTotals::for_bookings(self.unpaid.iter().map(|row| &row.booking), self.date)
    }

    /// Sum of the editable daily amounts over both sections
    pub fn daily_income(&self) -> f64 {
        self.rows().map(|row| row.daily_amount).sum()
    }

    /// Edit one booking's daily amount; false when the booking is not on the statement
    pub fn set_daily_amount(&mut self, booking_id: &str, amount: f64) -> bool {
        match self
            .regular
            .iter_mut()
            .chain(self.unpaid.iter_mut())
            .find(|row| row.booking.id == booking_id)
        {
            Some(row) => {
                row.daily_amount = amount;
                true
            }
            None => false,
        }
    }
}

/// Request recording `daily_amount` as paid against `booking` on `date`
pub fn payment_update(booking: &Booking, daily_amount: f64, date: NaiveDate) -> UpdateBookingPaymentRequest {
    let total_paid = booking.total_paid + daily_amount;
    UpdateBookingPaymentRequest {
        total_paid,
        due_payment: booking.total_bill - total_paid,
        daily_amount,
        search_date: search_date_timestamp(date),
    }
}
