//! Dairy shelf-life tracking service.
//!
//! Serves the shelf-life model from `shelfwatch-common` over HTTP, backed by an
//! in-memory or PostgreSQL product store.

pub mod api;
pub mod config;
pub mod error;
pub mod store;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use tower_http::timeout::TimeoutLayer;

pub use api::{router, AppState};
pub use config::Cli;
pub use store::{MemoryStore, PgStore, Store};

/// The full application: routes plus CORS and the per-request timeout, which
/// answers `408 Request Timeout`.
pub fn app(state: Arc<AppState>, cli: &Cli) -> anyhow::Result<Router> {
    Ok(router(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            cli.request_timeout(),
        ))
        .layer(cli.cors_layer()?))
}
