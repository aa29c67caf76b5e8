//! # REST API Interface Layer
//!
//! HTTP handlers translating requests into daily summary service calls and
//! domain errors into status codes with a `{ "message": ... }` body.

pub mod daily_summary_apis;

pub use daily_summary_apis::*;
