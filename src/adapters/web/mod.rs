//! Web server adapter.
//!
//! Axum JSON API over the series store: dataset listing, per-series queries
//! with resampling and normalization, and rolling correlation.

mod error;
mod handlers;

pub use error::{status_from_error, WebError};
pub use handlers::*;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ports::config_port::ConfigPort;
use crate::ports::series_port::SeriesPort;

pub struct AppState {
    pub series_port: Arc<dyn SeriesPort + Send + Sync>,
    pub config: Arc<dyn ConfigPort + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/healthz", get(handlers::healthz))
        .route("/api/datasets", get(handlers::datasets))
        .route("/api/data/{dataset}", get(handlers::data))
        .route("/api/correlation", get(handlers::correlation))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
