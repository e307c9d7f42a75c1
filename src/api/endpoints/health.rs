//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::core_state::CoreState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend_url: String,
    pub active_trackers: usize,
}

/// `GET /api/health` — gateway liveness check for the UI.
pub async fn check(State(state): State<Arc<CoreState>>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        backend_url: state.config().backend_url.clone(),
        active_trackers: state.trackers().active_count(),
    }))
}
