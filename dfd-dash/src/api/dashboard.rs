//! Dashboard API handlers
//!
//! POST /api/check, POST /api/navigate, POST /api/cancel and read-only
//! snapshots of the dashboard views.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analytics::AnalyticsSnapshot;
use crate::charts::ChartSpec;
use crate::dashboard::{DashboardState, ResultEntry};
use crate::error::{ApiError, ApiResult};
use crate::log_console::LogSnapshot;
use crate::AppState;

/// POST /api/check request
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Full image path forwarded to the classifier
    pub image: String,
    /// Identifier keying the image's render targets
    pub image_id: String,
}

/// POST /api/navigate request
#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub target: String,
}

/// POST /api/cancel request; no image id cancels everything
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub image_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: usize,
}

/// POST /api/check
///
/// Starts a detection in the background. Returns 202 Accepted; the outcome
/// arrives on the event stream.
pub async fn check_image(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> ApiResult<(StatusCode, Json<AcceptedResponse>)> {
    if request.image.trim().is_empty() {
        return Err(ApiError::BadRequest("image must not be empty".to_string()));
    }
    if request.image_id.trim().is_empty() {
        return Err(ApiError::BadRequest("image_id must not be empty".to_string()));
    }

    info!(image_id = %request.image_id, image = %request.image, "Check requested");
    state.dashboard.register_image(&request.image_id).await;
    state.dashboard.spawn_check(request.image, request.image_id);

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
}

/// POST /api/navigate
///
/// Unknown targets are accepted; they cycle the overlay without switching.
pub async fn navigate(
    State(state): State<AppState>,
    Json(request): Json<NavigateRequest>,
) -> (StatusCode, Json<AcceptedResponse>) {
    info!(nav_target = %request.target, "Navigation requested");
    state.dashboard.spawn_navigate(request.target);
    (StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true }))
}

/// POST /api/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Json(request): Json<CancelRequest>,
) -> Json<CancelResponse> {
    let cancelled = match request.image_id {
        Some(image_id) => state.dashboard.cancel(&image_id).await,
        None => state.dashboard.cancel_all().await,
    };
    Json(CancelResponse { cancelled })
}

/// GET /api/results
pub async fn get_results(State(state): State<AppState>) -> Json<Vec<ResultEntry>> {
    Json(state.dashboard.results().await)
}

/// GET /api/results/:image_id
pub async fn get_result(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> ApiResult<Json<ResultEntry>> {
    match state.dashboard.verdict(&image_id).await {
        Some(verdict) => Ok(Json(ResultEntry { image_id, verdict })),
        None => Err(ApiError::NotFound(format!("No result for image {}", image_id))),
    }
}

/// GET /api/analytics
pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsSnapshot> {
    Json(state.dashboard.analytics().await)
}

/// GET /api/logs
pub async fn get_logs(State(state): State<AppState>) -> Json<LogSnapshot> {
    Json(state.dashboard.logs().await)
}

/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Json<DashboardState> {
    Json(state.dashboard.state().await)
}

/// GET /api/charts/:surface
pub async fn get_chart(
    State(state): State<AppState>,
    Path(surface): Path<String>,
) -> ApiResult<Json<ChartSpec>> {
    state
        .dashboard
        .chart(&surface)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No chart on surface {}", surface)))
}

/// Build dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/check", post(check_image))
        .route("/api/navigate", post(navigate))
        .route("/api/cancel", post(cancel))
        .route("/api/results", get(get_results))
        .route("/api/results/:image_id", get(get_result))
        .route("/api/analytics", get(get_analytics))
        .route("/api/logs", get(get_logs))
        .route("/api/state", get(get_state))
        .route("/api/charts/:surface", get(get_chart))
}
