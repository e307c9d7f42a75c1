//! DICOM file endpoints: listing, detail, stats, upload, download.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::{Extension, Json};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::auth::Credential;
use crate::backend::UploadPayload;
use crate::core_state::CoreState;
use crate::models::{DicomFile, DicomListResponse, DicomStats, DownloadUrl};

/// Window for the "recent uploads" stat.
const RECENT_DAYS: i64 = 7;

/// Page size used when deriving stats from the listing.
const STATS_PAGE_SIZE: u32 = 500;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

/// `GET /api/dicom` — paginated listing pass-through.
pub async fn list(
    State(state): State<Arc<CoreState>>,
    Extension(cred): Extension<Credential>,
    Query(params): Query<ListParams>,
) -> Result<Json<DicomListResponse>, ApiError> {
    if params.page_size == 0 {
        return Err(ApiError::BadRequest("pageSize must be positive".into()));
    }
    let listing = state
        .backend()
        .list_files(&cred, params.page, params.page_size)
        .await?;
    Ok(Json(listing))
}

/// `GET /api/dicom/:id` — file metadata pass-through.
pub async fn detail(
    State(state): State<Arc<CoreState>>,
    Extension(cred): Extension<Credential>,
    Path(id): Path<String>,
) -> Result<Json<DicomFile>, ApiError> {
    let file = state.backend().get_file(&cred, &id).await?;
    Ok(Json(file))
}

/// `GET /api/dicom/stats` — dashboard numbers derived from the listing.
pub async fn stats(
    State(state): State<Arc<CoreState>>,
    Extension(cred): Extension<Credential>,
) -> Result<Json<DicomStats>, ApiError> {
    let listing = state
        .backend()
        .list_files(&cred, 1, STATS_PAGE_SIZE)
        .await?;
    Ok(Json(compute_stats(&listing)))
}

fn compute_stats(listing: &DicomListResponse) -> DicomStats {
    let cutoff = Utc::now() - Duration::days(RECENT_DAYS);
    let recent_uploads = listing
        .files
        .iter()
        .filter(|f| f.uploaded_at >= cutoff)
        .count() as u64;
    let total_bytes: u64 = listing.files.iter().map(|f| f.file_size).sum();
    DicomStats {
        total_files: listing.total,
        recent_uploads,
        storage_used: humanize_bytes(total_bytes),
    }
}

fn humanize_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// `POST /api/dicom/upload` — multipart relay to the backend.
///
/// The browser sends a single `file` part; content type falls back to
/// a guess from the file name when the part carries none.
pub async fn upload(
    State(state): State<Arc<CoreState>>,
    Extension(cred): Extension<Credential>,
    mut multipart: Multipart,
) -> Result<Json<DicomFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| ApiError::BadRequest("file part has no filename".into()))?;
        let content_type = field
            .content_type()
            .map(String::from)
            .unwrap_or_else(|| guess_content_type(&file_name));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("uploaded file is empty".into()));
        }

        tracing::info!(file_name = %file_name, size = bytes.len(), "relaying upload");
        let stored = state
            .backend()
            .upload(
                &cred,
                UploadPayload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                },
            )
            .await?;
        return Ok(Json(stored));
    }
    Err(ApiError::BadRequest("missing multipart field 'file'".into()))
}

fn guess_content_type(file_name: &str) -> String {
    // mime_guess has no entry for .dcm.
    if file_name.to_ascii_lowercase().ends_with(".dcm") {
        return "application/dicom".to_string();
    }
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// `GET /api/dicom/:id/download` — presigned URL pass-through.
pub async fn download(
    State(state): State<Arc<CoreState>>,
    Extension(cred): Extension<Credential>,
    Path(id): Path<String>,
) -> Result<Json<DownloadUrl>, ApiError> {
    let url = state.backend().download_url(&cred, &id).await?;
    Ok(Json(url))
}
