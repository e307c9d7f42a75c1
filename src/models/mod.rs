//! Wire types for the external imaging backend contract.
//!
//! All JSON field names follow the backend's documented camelCase shapes.
//! These types are fetched, never mutated locally.

pub mod analysis;
pub mod dicom;

pub use analysis::{
    AnalysisBody, AnalysisMetadata, AnalysisResult, AnalysisState, AnalysisStatus,
    DiagnosticAssessment, PixelSize, Severity,
};
pub use dicom::{DicomFile, DicomListResponse, DicomStats, DownloadUrl, ImageDimensions};
