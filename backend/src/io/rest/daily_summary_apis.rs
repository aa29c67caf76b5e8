//! # REST API for Daily Summaries
//!
//! Endpoints for reading and saving daily cash summaries and for auditing the
//! balance chain.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::{DailySummaryRangeQuery, ErrorResponse, SaveDailySummaryRequest};
use tracing::{error, info, warn};

use crate::domain::{DailySummaryService, SummaryError};
use crate::AppState;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// Translate a domain error to an HTTP response
fn summary_error_response(e: SummaryError) -> Response {
    match e {
        SummaryError::InvalidDate(_) | SummaryError::Validation(_) => {
            warn!("Rejected daily summary request: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        SummaryError::RevisionConflict { .. } => error_response(StatusCode::CONFLICT, e.to_string()),
        SummaryError::Storage(inner) => {
            error!("Daily summary storage failure: {:?}", inner);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Daily summary storage failure")
        }
    }
}

/// GET /api/daily-summary/:date
pub async fn get_daily_summary(State(state): State<AppState>, Path(raw_date): Path<String>) -> impl IntoResponse {
    info!("GET /api/daily-summary/{}", raw_date);

    let date = match DailySummaryService::parse_date(&raw_date) {
        Ok(date) => date,
        Err(e) => return summary_error_response(e),
    };

    match state.daily_summary_service.get_summary(date).await {
        Ok(Some(summary)) => (StatusCode::OK, Json(summary)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("No daily summary for {}", date)),
        Err(e) => summary_error_response(e),
    }
}

/// POST /api/daily-summary
///
/// 201 when the record was created, 200 when an existing one was replaced.
pub async fn save_daily_summary(
    State(state): State<AppState>,
    Json(request): Json<SaveDailySummaryRequest>,
) -> impl IntoResponse {
    info!("POST /api/daily-summary - date: {}", request.date);

    match state.daily_summary_service.save_summary(request).await {
        Ok(saved) => {
            let status = if saved.created { StatusCode::CREATED } else { StatusCode::OK };
            (status, Json(saved.summary)).into_response()
        }
        Err(e) => summary_error_response(e),
    }
}

/// GET /api/daily-summaries?from=&to=
pub async fn list_daily_summaries(
    State(state): State<AppState>,
    Query(query): Query<DailySummaryRangeQuery>,
) -> impl IntoResponse {
    info!("GET /api/daily-summaries - query: {:?}", query);

    match state.daily_summary_service.list_summaries(&query).await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => summary_error_response(e),
    }
}

/// GET /api/daily-summaries/audit?from=&to=
pub async fn audit_daily_summaries(
    State(state): State<AppState>,
    Query(query): Query<DailySummaryRangeQuery>,
) -> impl IntoResponse {
    info!("GET /api/daily-summaries/audit - query: {:?}", query);

    match state.daily_summary_service.audit_chain(&query).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => summary_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_router, storage::DbConnection, ServerConfig};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        Router,
    };
    use shared::{ChainAuditResponse, DailySummary};
    use tower::ServiceExt;

    async fn setup_test_router() -> Router {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let state = AppState::from_connection(db);
        create_router(state, &ServerConfig::default()).expect("Failed to build router")
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.clone().oneshot(request).await.expect("Request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body");
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Body is not JSON")
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn summary_body(date: &str, opening: f64, income: f64, expenses: f64) -> serde_json::Value {
        let total = opening + income;
        serde_json::json!({
            "date": date,
            "openingBalance": opening,
            "dailyIncome": income,
            "totalBalance": total,
            "dailyExpenses": expenses,
            "closingBalance": total - expenses,
        })
    }

    #[tokio::test]
    async fn test_get_missing_summary_is_not_found() {
        let router = setup_test_router().await;
        let (status, body) = send(&router, get("/api/daily-summary/2024-03-01")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("2024-03-01"));
    }

    #[tokio::test]
    async fn test_get_with_bad_date_is_bad_request() {
        let router = setup_test_router().await;
        let (status, _) = send(&router, get("/api/daily-summary/yesterday")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_creates_then_replaces() {
        let router = setup_test_router().await;

        let (status, body) = send(
            &router,
            post_json("/api/daily-summary", &summary_body("2024-03-01", 0.0, 500.0, 200.0)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["closingBalance"], 300.0);
        assert_eq!(body["revision"], 1);

        let (status, body) = send(
            &router,
            post_json("/api/daily-summary", &summary_body("2024-03-01", 0.0, 500.0, 100.0)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["closingBalance"], 400.0);
        assert_eq!(body["revision"], 2);

        let (status, body) = send(&router, get("/api/daily-summary/2024-03-01")).await;
        assert_eq!(status, StatusCode::OK);
        let fetched: DailySummary = serde_json::from_value(body).unwrap();
        assert_eq!(fetched.daily_expenses, 100.0);
    }

    #[tokio::test]
    async fn test_post_inconsistent_summary_is_bad_request() {
        let router = setup_test_router().await;
        let mut body = summary_body("2024-03-01", 0.0, 500.0, 200.0);
        body["totalBalance"] = serde_json::json!(123.0);

        let (status, body) = send(&router, post_json("/api/daily-summary", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("reconcile"));
    }

    #[tokio::test]
    async fn test_post_with_stale_revision_is_conflict() {
        let router = setup_test_router().await;
        send(&router, post_json("/api/daily-summary", &summary_body("2024-03-01", 0.0, 10.0, 0.0))).await;

        let mut body = summary_body("2024-03-01", 0.0, 10.0, 5.0);
        body["expectedRevision"] = serde_json::json!(0);
        let (status, _) = send(&router, post_json("/api/daily-summary", &body)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        body["expectedRevision"] = serde_json::json!(1);
        let (status, _) = send(&router, post_json("/api/daily-summary", &body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_and_audit() {
        let router = setup_test_router().await;
        send(&router, post_json("/api/daily-summary", &summary_body("2024-03-01", 0.0, 500.0, 200.0))).await;
        send(&router, post_json("/api/daily-summary", &summary_body("2024-03-02", 300.0, 400.0, 100.0))).await;
        send(&router, post_json("/api/daily-summary", &summary_body("2024-03-03", 0.0, 50.0, 0.0))).await;

        let (status, body) = send(&router, get("/api/daily-summaries?from=2024-03-02")).await;
        assert_eq!(status, StatusCode::OK);
        let listed: Vec<DailySummary> = serde_json::from_value(body).unwrap();
        assert_eq!(listed.len(), 2);

        let (status, body) = send(&router, get("/api/daily-summaries/audit")).await;
        assert_eq!(status, StatusCode::OK);
        let report: ChainAuditResponse = serde_json::from_value(body).unwrap();
        assert_eq!(report.records_checked, 3);
        // 2024-03-03 should have opened at 600
        assert_eq!(report.discrepancies.len(), 1);
        assert_eq!(report.discrepancies[0].expected, 600.0);
    }
}
