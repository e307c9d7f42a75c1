//! Imaging backend access.
//!
//! The gateway holds no DICOM data of its own; everything is fetched
//! from the imaging backend over HTTP. `DicomBackend` is the seam:
//! production code uses [`client::BackendClient`], tests script a
//! [`mock::MockBackend`].

pub mod client;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Credential;
use crate::models::{
    AnalysisResult, AnalysisStatus, DicomFile, DicomListResponse, DownloadUrl,
};

pub use client::BackendClient;
pub use mock::MockBackend;

/// Errors from backend calls.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Cannot reach imaging backend at {0}")]
    Connection(String),

    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse backend response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl BackendError {
    /// HTTP status carried by the backend response, if this error
    /// came from a non-2xx reply.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Raw image payload from the WADO rendering endpoint.
#[derive(Debug, Clone)]
pub struct WadoImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// One uploaded file, as handed to the backend.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Everything the gateway asks of the imaging backend.
///
/// Every call carries the caller's [`Credential`]; the backend owns
/// authorization decisions.
#[async_trait]
pub trait DicomBackend: Send + Sync {
    async fn list_files(
        &self,
        cred: &Credential,
        page: u32,
        page_size: u32,
    ) -> Result<DicomListResponse, BackendError>;

    async fn get_file(&self, cred: &Credential, id: &str) -> Result<DicomFile, BackendError>;

    async fn upload(
        &self,
        cred: &Credential,
        payload: UploadPayload,
    ) -> Result<DicomFile, BackendError>;

    async fn download_url(
        &self,
        cred: &Credential,
        id: &str,
    ) -> Result<DownloadUrl, BackendError>;

    async fn wado_image(&self, cred: &Credential, id: &str) -> Result<WadoImage, BackendError>;

    /// Ask the backend to start (or restart) analysis for a file.
    async fn trigger_analysis(
        &self,
        cred: &Credential,
        id: &str,
    ) -> Result<AnalysisStatus, BackendError>;

    /// Current analysis lifecycle status for a file.
    async fn analysis_status(
        &self,
        cred: &Credential,
        id: &str,
    ) -> Result<AnalysisStatus, BackendError>;

    /// Full analysis record. Only meaningful once status is completed.
    async fn analysis_result(
        &self,
        cred: &Credential,
        id: &str,
    ) -> Result<AnalysisResult, BackendError>;
}
