//! HTTP layer for the procurement research pipeline.
//!
//! Thin axum application: job submission, health check and read-only
//! report serving. All pipeline behavior lives in the `procurement`
//! library.

pub mod app;
pub mod config;
pub mod routes;

pub use app::{build_app, AppState};
pub use config::Config;
