use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use shared::{
    CheckInBookings, CheckInBookingsResponse, DailySummary, ErrorResponse, SaveDailySummaryRequest,
    UpdateBookingPaymentRequest,
};
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::ApiError;
use crate::services::date_utils::format_api_date;
use crate::services::session::SessionContext;
use crate::services::store::{BookingStore, DailySummaryStore, SavedSummary};

/// A daily summary as sent back by the store.
///
/// Only the amounts are read and each one is optional; the record's own
/// `date` is ignored in favour of the date that was requested or saved.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryBody {
    opening_balance: Option<f64>,
    daily_income: Option<f64>,
    total_balance: Option<f64>,
    daily_expenses: Option<f64>,
    closing_balance: Option<f64>,
    revision: Option<i64>,
}

impl SummaryBody {
    /// Parse a response body; `None` for an empty or `null` body or one that is not an object
    fn parse(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        serde_json::from_str::<Option<Self>>(text).ok().flatten()
    }

    fn is_record(&self) -> bool {
        self.closing_balance.is_some()
    }

    /// Fill `base` with the amounts the body carries
    fn merge_onto(self, mut base: DailySummary) -> DailySummary {
        base.opening_balance = self.opening_balance.unwrap_or(base.opening_balance);
        base.daily_income = self.daily_income.unwrap_or(base.daily_income);
        base.total_balance = self.total_balance.unwrap_or(base.total_balance);
        base.daily_expenses = self.daily_expenses.unwrap_or(base.daily_expenses);
        base.closing_balance = self.closing_balance.unwrap_or(base.closing_balance);
        base.revision = self.revision.or(base.revision);
        base
    }
}

/// API client for communicating with the dashboard REST backend
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Create a client; requests carry the session's bearer token while one is active
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Create a client for a custom base URL with default settings
    pub fn with_base_url(base_url: impl Into<String>, session: SessionContext) -> Result<Self, ApiError> {
        Self::new(&ClientConfig::new().with_base_url(base_url), session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Turn a non-success response into an error, preferring the server's `{message}`
    async fn error_from_response(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => body.message,
            Err(_) if text.trim().is_empty() => format!("HTTP {}", status),
            Err(_) => text,
        };
        ApiError::from_status(status, message)
    }
}

#[async_trait]
impl DailySummaryStore for ApiClient {
    async fn get_daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, ApiError> {
        let url = self.url(&format!("/daily-summary/{}", format_api_date(date)));
        debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        // Missing amounts read as 0, so a body with only closingBalance still carries the balance forward
        let text = response.text().await?;
        if text.trim().is_empty() || text.trim() == "null" {
            return Ok(None);
        }
        let body = serde_json::from_str::<SummaryBody>(&text)
            .map_err(|e| ApiError::Decode(format!("daily summary for {}: {}", format_api_date(date), e)))?;
        Ok(Some(body.merge_onto(DailySummary::from_inputs(date, 0.0, 0.0, 0.0))))
    }

    /// Any 2xx status counts as saved; 201 means created, anything else replaced.
    ///
    /// The stored record is read from the body when it carries one, otherwise
    /// the summary that was sent stands in for it (without a revision).
    async fn save_daily_summary(&self, request: &SaveDailySummaryRequest) -> Result<SavedSummary, ApiError> {
        let url = self.url("/daily-summary");
        debug!("POST {} for {}", url, request.date);

        let response = self.authorize(self.client.post(&url)).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let sent = request.clone().into_summary();
        let text = response.text().await.unwrap_or_default();
        let summary = match SummaryBody::parse(&text) {
            Some(body) if body.is_record() => body.merge_onto(sent),
            _ => sent,
        };

        Ok(SavedSummary {
            summary,
            created: status == StatusCode::CREATED,
        })
    }
}

#[async_trait]
impl BookingStore for ApiClient {
    async fn get_check_in_bookings(&self, date: NaiveDate) -> Result<CheckInBookings, ApiError> {
        let url = self.url(&format!("/bookings/check-in/{}", format_api_date(date)));
        debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let envelope = response.json::<CheckInBookingsResponse>().await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn update_booking_payment(&self, booking_id: &str, request: &UpdateBookingPaymentRequest) -> Result<(), ApiError> {
        let url = self.url(&format!("/booking/details/{}", booking_id));
        debug!("PUT {}", url);

        let response = self.authorize(self.client.put(&url)).json(request).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }
}
