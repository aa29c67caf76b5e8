use chrono::{DateTime, NaiveDate};

/// Format a date as the `YYYY-MM-DD` string used in API paths
pub fn format_api_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` date string
pub fn parse_api_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

/// The calendar day before `date` (saturates at the minimum representable date)
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// The calendar day after `date` (saturates at the maximum representable date)
pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// Calendar day of a booking timestamp.
///
/// Accepts RFC 3339 timestamps (the day in the timestamp's own offset) and
/// plain `YYYY-MM-DD` strings.
pub fn day_of_timestamp(timestamp: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.date_naive());
    }
    timestamp.get(..10).and_then(parse_api_date)
}

/// Midnight UTC of `date` as RFC 3339, the form the booking API expects for `searchDate`
pub fn search_date_timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", format_api_date(date))
}
