//! View projection for the analysis panel.
//!
//! A pure function from a [`TrackerSnapshot`] to exactly one of five
//! render states. Precedence is explicit and total, evaluated top to
//! bottom:
//!
//! 1. any error (trigger, poll, result fetch) or a `failed` status
//! 2. no status yet, or `not_started`
//! 3. `pending` / `processing`
//! 4. `completed` with a fetched result body
//! 5. anything else (completed, result still on its way)

use serde::Serialize;

use super::tracker::TrackerSnapshot;
use crate::models::{AnalysisBody, AnalysisMetadata, AnalysisState, Severity};
use chrono::{DateTime, Utc};

/// Distinguishes "queued" from "actively analyzing" progress copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressPhase {
    Queued,
    Analyzing,
}

/// What the analysis panel should render right now.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ViewState {
    #[serde(rename_all = "camelCase")]
    NotStarted { trigger_enabled: bool },
    #[serde(rename_all = "camelCase")]
    InProgress { phase: ProgressPhase },
    #[serde(rename_all = "camelCase")]
    Error {
        message: String,
        retry_enabled: bool,
    },
    #[serde(rename_all = "camelCase")]
    Report {
        severity: Severity,
        /// Rendered as a separate warning block, always distinct from
        /// the severity badge.
        urgent_findings: bool,
        body: AnalysisBody,
        metadata: Option<AnalysisMetadata>,
        completed_at: Option<DateTime<Utc>>,
    },
    Loading,
}

/// Project a snapshot into its single render state.
pub fn project(snap: &TrackerSnapshot) -> ViewState {
    let lifecycle = snap.status.as_ref().map(|s| s.status);
    let failed = lifecycle == Some(AnalysisState::Failed);
    let has_error = failed
        || snap.trigger_error.is_some()
        || snap.poll_error.is_some()
        || snap.fetch_error.is_some();

    if has_error {
        return ViewState::Error {
            message: error_message(snap, failed),
            retry_enabled: !snap.trigger_in_flight,
        };
    }

    match lifecycle {
        None | Some(AnalysisState::NotStarted) => ViewState::NotStarted {
            trigger_enabled: !snap.trigger_in_flight,
        },
        Some(AnalysisState::Pending) => ViewState::InProgress {
            phase: ProgressPhase::Queued,
        },
        Some(AnalysisState::Processing) => ViewState::InProgress {
            phase: ProgressPhase::Analyzing,
        },
        Some(AnalysisState::Completed) => match &snap.result {
            Some(result) => match &result.analysis {
                Some(body) => ViewState::Report {
                    severity: body.severity,
                    urgent_findings: body.diagnostic_assessment.urgent_findings,
                    body: body.clone(),
                    metadata: result.metadata.clone(),
                    completed_at: result.completed_at,
                },
                None => ViewState::Loading,
            },
            None => ViewState::Loading,
        },
        // Covered by the error branch above; kept total.
        Some(AnalysisState::Failed) => ViewState::Error {
            message: error_message(snap, true),
            retry_enabled: !snap.trigger_in_flight,
        },
    }
}

/// Most specific message available: result-embedded error, then the
/// failed status message, then a transport error, then a generic line.
fn error_message(snap: &TrackerSnapshot, failed: bool) -> String {
    if let Some(msg) = snap
        .result
        .as_ref()
        .and_then(|r| r.metadata.as_ref())
        .and_then(|m| m.error.clone())
    {
        return msg;
    }
    if failed {
        if let Some(msg) = snap.status.as_ref().and_then(|s| s.message.clone()) {
            return msg;
        }
    }
    if let Some(msg) = snap
        .trigger_error
        .clone()
        .or_else(|| snap.fetch_error.clone())
        .or_else(|| snap.poll_error.clone())
    {
        return msg;
    }
    "Analysis failed".to_string()
}
