use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tolerance used when checking stored amounts against the balance identities.
pub const BALANCE_EPSILON: f64 = 0.001;

/// One day's cash reconciliation as persisted by the daily summary store.
///
/// Serialized with camelCase field names and `date` as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Closing balance carried over from the previous day (0 when there is none)
    pub opening_balance: f64,
    /// Sum of booking payments collected on this date
    pub daily_income: f64,
    /// opening_balance + daily_income
    pub total_balance: f64,
    /// Cash outflows entered by the operator
    pub daily_expenses: f64,
    /// total_balance - daily_expenses, may be negative
    pub closing_balance: f64,
    /// Store-assigned write counter, absent on client-built records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

impl DailySummary {
    /// Build a record whose derived fields come from [`recompute`].
    pub fn from_inputs(date: NaiveDate, opening_balance: f64, daily_income: f64, daily_expenses: f64) -> Self {
        let totals = recompute(opening_balance, daily_income, daily_expenses);
        Self {
            date,
            opening_balance,
            daily_income,
            total_balance: totals.total_balance,
            daily_expenses,
            closing_balance: totals.closing_balance,
            revision: None,
        }
    }

    /// The derived totals this record should carry given its inputs
    pub fn expected_totals(&self) -> BalanceTotals {
        recompute(self.opening_balance, self.daily_income, self.daily_expenses)
    }

    /// True when the stored totals agree with the inputs within [`BALANCE_EPSILON`]
    pub fn is_consistent(&self) -> bool {
        let expected = self.expected_totals();
        (expected.total_balance - self.total_balance).abs() <= BALANCE_EPSILON
            && (expected.closing_balance - self.closing_balance).abs() <= BALANCE_EPSILON
    }
}

/// Derived balances for a day
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceTotals {
    pub total_balance: f64,
    pub closing_balance: f64,
}

/// Compute total and closing balance.
///
/// No rounding and no clamping: a negative closing balance is a cash shortfall.
pub fn recompute(opening_balance: f64, daily_income: f64, daily_expenses: f64) -> BalanceTotals {
    let total_balance = opening_balance + daily_income;
    BalanceTotals {
        total_balance,
        closing_balance: total_balance - daily_expenses,
    }
}

/// Body of `POST /daily-summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDailySummaryRequest {
    pub date: NaiveDate,
    pub opening_balance: f64,
    pub daily_income: f64,
    pub total_balance: f64,
    pub daily_expenses: f64,
    pub closing_balance: f64,
    /// When present the write only succeeds if the stored revision matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_revision: Option<i64>,
}

impl SaveDailySummaryRequest {
    pub fn from_summary(summary: &DailySummary, expected_revision: Option<i64>) -> Self {
        Self {
            date: summary.date,
            opening_balance: summary.opening_balance,
            daily_income: summary.daily_income,
            total_balance: summary.total_balance,
            daily_expenses: summary.daily_expenses,
            closing_balance: summary.closing_balance,
            expected_revision,
        }
    }

    pub fn into_summary(self) -> DailySummary {
        DailySummary {
            date: self.date,
            opening_balance: self.opening_balance,
            daily_income: self.daily_income,
            total_balance: self.total_balance,
            daily_expenses: self.daily_expenses,
            closing_balance: self.closing_balance,
            revision: None,
        }
    }
}

/// Query for a date range of summaries, both bounds inclusive and optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummaryRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Kind of break found in the opening -> closing chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainDiscrepancyKind {
    /// Previous day exists but its closing balance differs from this opening
    OpeningMismatch,
    /// No previous day on record but the opening balance is not zero
    UnexpectedOpening,
    /// total_balance != opening_balance + daily_income
    TotalMismatch,
    /// closing_balance != total_balance - daily_expenses
    ClosingMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDiscrepancy {
    pub date: NaiveDate,
    pub kind: ChainDiscrepancyKind,
    pub expected: f64,
    pub actual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAuditResponse {
    pub records_checked: usize,
    pub discrepancies: Vec<ChainDiscrepancy>,
}

/// Error body returned by the REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// One dated payment line of a booking invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    /// RFC 3339 timestamp or plain `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub daily_amount: f64,
    #[serde(default)]
    pub total_paid: f64,
}

/// A booking as returned by the check-in listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub booking_no: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub room_number_name: Option<String>,
    #[serde(default)]
    pub check_in_date: Option<String>,
    #[serde(default)]
    pub check_out_date: Option<String>,
    #[serde(default)]
    pub nights: Option<u32>,
    #[serde(default)]
    pub total_bill: f64,
    #[serde(default)]
    pub total_paid: f64,
    #[serde(default)]
    pub advance_payment: f64,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(rename = "statusID", default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub daily_amount: f64,
    #[serde(default)]
    pub invoice_details: Option<Vec<InvoiceDetail>>,
}

/// Bookings checked in on a date, split into the two statement sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInBookings {
    #[serde(default)]
    pub regular_invoice: Vec<Booking>,
    #[serde(default)]
    pub un_paid_invoice: Vec<Booking>,
}

/// Envelope of `GET /bookings/check-in/{date}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckInBookingsResponse {
    #[serde(default)]
    pub data: Option<CheckInBookings>,
}

/// Body of `PUT /booking/details/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingPaymentRequest {
    pub total_paid: f64,
    pub due_payment: f64,
    pub daily_amount: f64,
    /// RFC 3339 timestamp of the statement date
    pub search_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_recompute_identities() {
        let totals = recompute(300.0, 400.0, 100.0);
        assert_eq!(totals.total_balance, 700.0);
        assert_eq!(totals.closing_balance, 600.0);
    }

    #[test]
    fn test_recompute_allows_negative_closing() {
        let totals = recompute(0.0, 100.0, 150.0);
        assert_eq!(totals.total_balance, 100.0);
        assert_eq!(totals.closing_balance, -50.0);
    }

    #[test]
    fn test_recompute_is_stable_across_repeated_calls() {
        let first = recompute(0.1, 0.2, 0.3);
        for _ in 0..100 {
            assert_eq!(recompute(0.1, 0.2, 0.3), first);
        }
    }

    #[test]
    fn test_daily_summary_wire_format() {
        let summary = DailySummary::from_inputs(date("2024-03-05"), 0.0, 500.0, 200.0);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["date"], "2024-03-05");
        assert_eq!(json["openingBalance"], 0.0);
        assert_eq!(json["dailyIncome"], 500.0);
        assert_eq!(json["totalBalance"], 500.0);
        assert_eq!(json["dailyExpenses"], 200.0);
        assert_eq!(json["closingBalance"], 300.0);
        assert!(json.get("revision").is_none());
    }

    #[test]
    fn test_daily_summary_consistency_check() {
        let mut summary = DailySummary::from_inputs(date("2024-03-05"), 10.0, 5.0, 20.0);
        assert!(summary.is_consistent());

        summary.closing_balance += 1.0;
        assert!(!summary.is_consistent());
    }

    #[test]
    fn test_save_request_omits_missing_revision() {
        let summary = DailySummary::from_inputs(date("2024-03-05"), 0.0, 1.0, 0.0);
        let body = serde_json::to_value(SaveDailySummaryRequest::from_summary(&summary, None)).unwrap();
        assert!(body.get("expectedRevision").is_none());

        let body = serde_json::to_value(SaveDailySummaryRequest::from_summary(&summary, Some(3))).unwrap();
        assert_eq!(body["expectedRevision"], 3);
    }

    #[test]
    fn test_booking_tolerates_missing_fields() {
        let json = r#"{
            "_id": "b1",
            "bookingNo": "INV-1",
            "fullName": "Guest",
            "totalBill": 1000,
            "statusID": 255,
            "invoiceDetails": [{ "date": "2024-03-05T00:00:00.000Z", "dailyAmount": 200 }]
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();

        assert_eq!(booking.id, "b1");
        assert_eq!(booking.total_paid, 0.0);
        assert_eq!(booking.status_id, Some(255));
        let details = booking.invoice_details.unwrap();
        assert_eq!(details[0].daily_amount, 200.0);
        assert_eq!(details[0].total_paid, 0.0);
    }

    #[test]
    fn test_check_in_envelope_without_data() {
        let response: CheckInBookingsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.data.is_none());
    }
}
