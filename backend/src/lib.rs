//! # Cash Ledger Backend
//!
//! Reference daily summary store for the cash ledger dashboard.
//!
//! ```text
//! HTTP clients (admin dashboard)
//!     ↓
//! IO Layer (REST handlers)
//!     ↓
//! Domain Layer (validation, revision check, chain audit)
//!     ↓
//! Storage Layer (SQLite)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use config::{ConfigError, ServerConfig};
use domain::DailySummaryService;
use storage::{DailySummaryRepository, DbConnection};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub daily_summary_service: DailySummaryService,
}

impl AppState {
    /// Wire the services on top of an open database connection
    pub fn from_connection(db: DbConnection) -> Self {
        let repository = DailySummaryRepository::new(db);
        Self {
            daily_summary_service: DailySummaryService::new(Arc::new(repository)),
        }
    }
}

/// Open the database and build the application state
pub async fn initialize_backend(config: &ServerConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    info!("Setting up application state");
    Ok(AppState::from_connection(db))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &ServerConfig) -> Result<Router> {
    // CORS setup to allow the dashboard to make requests
    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/daily-summary", post(io::save_daily_summary))
        .route("/daily-summary/:date", get(io::get_daily_summary))
        .route("/daily-summaries", get(io::list_daily_summaries))
        .route("/daily-summaries/audit", get(io::audit_daily_summaries));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
