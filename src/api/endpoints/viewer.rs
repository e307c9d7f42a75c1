//! WADO image proxy for the browser-side renderer.
//!
//! The third-party renderer loads pixel data through the gateway so
//! the bearer credential stays on requests the gateway controls.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::api::error::ApiError;
use crate::auth::Credential;
use crate::core_state::CoreState;

/// `GET /api/dicom/:id/wado` — raw image bytes with the backend's
/// content type.
pub async fn wado(
    State(state): State<Arc<CoreState>>,
    Extension(cred): Extension<Credential>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let image = state.backend().wado_image(&cred, &id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, image.content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        image.bytes,
    )
        .into_response())
}
