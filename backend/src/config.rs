//! Server configuration read from the environment.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

pub const BIND_ADDR_VAR: &str = "CASH_LEDGER_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "CASH_LEDGER_DATABASE_URL";
pub const ALLOWED_ORIGIN_VAR: &str = "CASH_LEDGER_ALLOWED_ORIGIN";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DATABASE_URL: &str = "sqlite:daily_summary.db";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBindAddr { var: &'static str, value: String },
    #[error("{var} is not a valid origin header value: {value}")]
    InvalidOrigin { var: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Origin allowed by the CORS layer (the admin dashboard)
    pub allowed_origin: String,
}

impl ServerConfig {
    /// Read configuration from process environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr {
                var: BIND_ADDR_VAR,
                value: bind_raw.clone(),
            })?;

        let database_url = lookup(DATABASE_URL_VAR).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        if database_url.trim().is_empty() {
            return Err(ConfigError::Empty(DATABASE_URL_VAR));
        }

        let allowed_origin = lookup(ALLOWED_ORIGIN_VAR).unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());
        if allowed_origin.parse::<HeaderValue>().is_err() {
            return Err(ConfigError::InvalidOrigin {
                var: ALLOWED_ORIGIN_VAR,
                value: allowed_origin,
            });
        }

        Ok(Self {
            bind_addr,
            database_url,
            allowed_origin,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}
