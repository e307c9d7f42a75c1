use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Pixel matrix size reported in the DICOM metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub rows: u32,
    pub columns: u32,
}

/// One stored DICOM file as the backend describes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomFile {
    pub id: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    pub file_size: u64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
}

/// Paginated listing returned by `GET /api/dicom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomListResponse {
    pub files: Vec<DicomFile>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Aggregate numbers for the dashboard stats bar.
///
/// The backend exposes no stats endpoint; the gateway derives these
/// from the file listing (see `api::endpoints::files::stats`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomStats {
    pub total_files: u64,
    pub recent_uploads: u64,
    pub storage_used: String,
}

/// Presigned download URL issued by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrl {
    pub url: String,
    pub expires_in: u64,
    pub file_name: String,
}
