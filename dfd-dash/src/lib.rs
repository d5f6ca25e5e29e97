//! dfd-dash library
//!
//! Result synchronization and multi-view rendering engine for the deepfake
//! detection dashboard, plus the HTTP/SSE surface that exposes it.

pub mod analytics;
pub mod api;
pub mod charts;
pub mod classifier;
pub mod coordinator;
pub mod dashboard;
pub mod detail;
pub mod error;
pub mod format;
pub mod log_console;
pub mod navigation;
pub mod overlay;
pub mod store;
pub mod targets;
pub mod views;

pub use crate::dashboard::Dashboard;
pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            startup_time: Utc::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::dashboard_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
