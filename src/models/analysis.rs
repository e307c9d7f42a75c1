//! Analysis lifecycle types.
//!
//! An analysis run moves monotonically through
//! `not_started → pending → processing → {completed | failed}`.
//! The only way out of a terminal state is a new trigger, which the
//! backend treats as restarting the lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    NotStarted,
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AnalysisState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `completed` or `failed` — no further polling once reached.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// States for which the poller keeps scheduling requests.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl std::fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight status record returned by the trigger and status endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStatus {
    pub dicom_id: String,
    pub status: AnalysisState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Severity grade assigned by the analysis model.
///
/// Serialized capitalized, exactly as the backend emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Normal => "Normal",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        };
        f.write_str(s)
    }
}

/// Structured diagnostic conclusion inside an analysis body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticAssessment {
    pub primary_diagnosis: Option<String>,
    #[serde(default)]
    pub differential_diagnoses: Vec<String>,
    #[serde(default)]
    pub urgent_findings: bool,
}

/// The analysis payload proper. Present only on completed runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBody {
    pub raw_response: String,
    pub image_type: Option<String>,
    pub anatomical_region: Option<String>,
    #[serde(default)]
    pub observations: Vec<String>,
    pub diagnostic_assessment: DiagnosticAssessment,
    pub patient_friendly_explanation: Option<String>,
    pub severity: Severity,
}

/// Run metadata attached to a result (timings, model, error detail).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_dimensions: Option<PixelSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub langchain_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// Full analysis record returned by `GET /api/dicom/{id}/analysis`.
///
/// Only meaningful once status is `completed`; `analysis` is `null`
/// for runs that have not produced a body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub dicom_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub status: AnalysisState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub analysis: Option<AnalysisBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnalysisMetadata>,
}
