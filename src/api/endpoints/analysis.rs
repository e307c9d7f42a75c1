//! Analysis endpoints: tracking activation, trigger, view projection.
//!
//! The browser drives these from the detail page: activate tracking
//! on mount, poll the cheap view endpoint, trigger on button press,
//! deactivate on unmount. All lifecycle logic lives in the tracker;
//! handlers only map HTTP onto it.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::analysis::view::{self, ViewState};
use crate::api::error::ApiError;
use crate::auth::Credential;
use crate::core_state::CoreState;

/// `POST /api/dicom/:id/analysis/track` — start tracking. Idempotent;
/// returns the current view.
pub async fn track_start(
    State(state): State<Arc<CoreState>>,
    Extension(cred): Extension<Credential>,
    Path(id): Path<String>,
) -> Result<Json<ViewState>, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("empty file id".into()));
    }
    let tracker = state.trackers().activate(&id, cred);
    Ok(Json(view::project(&tracker.snapshot())))
}

/// `DELETE /api/dicom/:id/analysis/track` — stop tracking. Safe for
/// unknown ids.
pub async fn track_stop(
    State(state): State<Arc<CoreState>>,
    Path(id): Path<String>,
) -> StatusCode {
    state.trackers().deactivate(&id);
    StatusCode::NO_CONTENT
}

/// `POST /api/dicom/:id/analyze` — trigger analysis. Activates
/// tracking if the subject is not yet tracked, so the poll loop picks
/// up the run it just started. Errors surface through the returned
/// view, not as HTTP failures, so the panel always has one coherent
/// render state.
pub async fn trigger(
    State(state): State<Arc<CoreState>>,
    Extension(cred): Extension<Credential>,
    Path(id): Path<String>,
) -> Result<Json<ViewState>, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("empty file id".into()));
    }
    let tracker = state.trackers().activate(&id, cred);
    tracker.trigger().await;
    Ok(Json(view::project(&tracker.snapshot())))
}

/// `GET /api/dicom/:id/analysis` — current view projection. Reading
/// never spawns a poller; an untracked subject projects from the
/// empty state.
pub async fn view(State(state): State<Arc<CoreState>>, Path(id): Path<String>) -> Json<ViewState> {
    let snapshot = state
        .trackers()
        .get(&id)
        .map(|t| t.snapshot())
        .unwrap_or_default();
    Json(view::project(&snapshot))
}
