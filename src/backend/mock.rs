//! Scripted backend for tests.
//!
//! Each call family (trigger, status, result) consumes a queue of
//! scripted responses; when a queue runs dry the last entry repeats,
//! which matches a real backend that keeps answering the same thing
//! until the run advances. Call counts and status-call timestamps are
//! recorded so tests can assert on scheduling behavior.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Instant;

use super::{BackendError, DicomBackend, UploadPayload, WadoImage};
use crate::auth::Credential;
use crate::models::{
    AnalysisResult, AnalysisState, AnalysisStatus, DicomFile, DicomListResponse, DownloadUrl,
};

/// Cloneable stand-in for a failed backend call.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Transport,
    Http(u16, String),
}

impl MockFailure {
    fn into_error(self) -> BackendError {
        match self {
            Self::Transport => BackendError::Connection("mock".into()),
            Self::Http(status, body) => BackendError::Status { status, body },
        }
    }
}

type Scripted<T> = Result<T, MockFailure>;

#[derive(Default)]
struct Script {
    statuses: VecDeque<Scripted<AnalysisStatus>>,
    last_status: Option<Scripted<AnalysisStatus>>,
    triggers: VecDeque<Scripted<AnalysisStatus>>,
    last_trigger: Option<Scripted<AnalysisStatus>>,
    results: VecDeque<Scripted<AnalysisResult>>,
    last_result: Option<Scripted<AnalysisResult>>,
    files: Vec<DicomFile>,
}

#[derive(Default)]
struct Calls {
    status: usize,
    trigger: usize,
    result: usize,
    status_times: Vec<Instant>,
}

pub struct MockBackend {
    script: Mutex<Script>,
    calls: Mutex<Calls>,
    status_delay: Mutex<Option<Duration>>,
    trigger_delay: Mutex<Option<Duration>>,
}

/// Build a minimal status record for scripting.
pub fn status(id: &str, state: AnalysisState) -> AnalysisStatus {
    AnalysisStatus {
        dicom_id: id.to_string(),
        status: state,
        message: None,
        created_at: Some(Utc::now()),
        completed_at: state.is_terminal().then(Utc::now),
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::default()),
            calls: Mutex::new(Calls::default()),
            status_delay: Mutex::new(None),
            trigger_delay: Mutex::new(None),
        }
    }

    pub fn with_statuses(self, statuses: Vec<AnalysisStatus>) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.statuses = statuses.into_iter().map(Ok).collect();
        }
        self
    }

    pub fn push_status(&self, status: AnalysisStatus) {
        self.script.lock().unwrap().statuses.push_back(Ok(status));
    }

    pub fn push_status_failure(&self, failure: MockFailure) {
        self.script.lock().unwrap().statuses.push_back(Err(failure));
    }

    pub fn push_trigger(&self, status: AnalysisStatus) {
        self.script.lock().unwrap().triggers.push_back(Ok(status));
    }

    pub fn push_trigger_failure(&self, failure: MockFailure) {
        self.script.lock().unwrap().triggers.push_back(Err(failure));
    }

    pub fn push_result(&self, result: AnalysisResult) {
        self.script.lock().unwrap().results.push_back(Ok(result));
    }

    pub fn push_result_failure(&self, failure: MockFailure) {
        self.script.lock().unwrap().results.push_back(Err(failure));
    }

    pub fn with_files(self, files: Vec<DicomFile>) -> Self {
        self.script.lock().unwrap().files = files;
        self
    }

    /// Delay applied to every status call, to simulate slow polls.
    pub fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = Some(delay);
    }

    /// Delay applied to every trigger call, to simulate in-flight triggers.
    pub fn set_trigger_delay(&self, delay: Duration) {
        *self.trigger_delay.lock().unwrap() = Some(delay);
    }

    pub fn status_calls(&self) -> usize {
        self.calls.lock().unwrap().status
    }

    pub fn trigger_calls(&self) -> usize {
        self.calls.lock().unwrap().trigger
    }

    pub fn result_calls(&self) -> usize {
        self.calls.lock().unwrap().result
    }

    /// Instants at which each status call arrived.
    pub fn status_call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().status_times.clone()
    }

    fn next<T: Clone>(
        queue: &mut VecDeque<Scripted<T>>,
        last: &mut Option<Scripted<T>>,
        empty_msg: &str,
    ) -> Result<T, BackendError> {
        let scripted = match queue.pop_front() {
            Some(item) => {
                *last = Some(item.clone());
                item
            }
            None => match last.clone() {
                Some(item) => item,
                None => {
                    return Err(BackendError::Status {
                        status: 500,
                        body: empty_msg.to_string(),
                    })
                }
            },
        };
        scripted.map_err(MockFailure::into_error)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DicomBackend for MockBackend {
    async fn list_files(
        &self,
        _cred: &Credential,
        page: u32,
        page_size: u32,
    ) -> Result<DicomListResponse, BackendError> {
        let files = self.script.lock().unwrap().files.clone();
        let total = files.len() as u64;
        Ok(DicomListResponse {
            files,
            total,
            page,
            page_size,
        })
    }

    async fn get_file(&self, _cred: &Credential, id: &str) -> Result<DicomFile, BackendError> {
        let file = self
            .script
            .lock()
            .unwrap()
            .files
            .iter()
            .find(|f| f.id == id)
            .cloned();
        file.ok_or(BackendError::Status {
            status: 404,
            body: "not found".into(),
        })
    }

    async fn upload(
        &self,
        _cred: &Credential,
        payload: UploadPayload,
    ) -> Result<DicomFile, BackendError> {
        let file = DicomFile {
            id: format!("mock-{}", payload.file_name),
            file_name: payload.file_name,
            file_size: payload.bytes.len() as u64,
            uploaded_at: Utc::now(),
            patient_name: None,
            patient_id: None,
            modality: None,
            study_date: None,
            description: None,
            series_description: None,
            study_description: None,
            dimensions: None,
        };
        self.script.lock().unwrap().files.push(file.clone());
        Ok(file)
    }

    async fn download_url(
        &self,
        _cred: &Credential,
        id: &str,
    ) -> Result<DownloadUrl, BackendError> {
        Ok(DownloadUrl {
            url: format!("https://storage.example/{id}"),
            expires_in: 3600,
            file_name: format!("{id}.dcm"),
        })
    }

    async fn wado_image(&self, _cred: &Credential, _id: &str) -> Result<WadoImage, BackendError> {
        Ok(WadoImage {
            content_type: "image/png".into(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        })
    }

    async fn trigger_analysis(
        &self,
        _cred: &Credential,
        id: &str,
    ) -> Result<AnalysisStatus, BackendError> {
        self.calls.lock().unwrap().trigger += 1;
        let delay = *self.trigger_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.script.lock().unwrap();
        if script.triggers.is_empty() && script.last_trigger.is_none() {
            return Ok(status(id, AnalysisState::Pending));
        }
        let Script {
            triggers,
            last_trigger,
            ..
        } = &mut *script;
        Self::next(triggers, last_trigger, "no trigger scripted")
    }

    async fn analysis_status(
        &self,
        _cred: &Credential,
        id: &str,
    ) -> Result<AnalysisStatus, BackendError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.status += 1;
            calls.status_times.push(Instant::now());
        }
        let delay = *self.status_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.script.lock().unwrap();
        if script.statuses.is_empty() && script.last_status.is_none() {
            return Ok(status(id, AnalysisState::NotStarted));
        }
        let Script {
            statuses,
            last_status,
            ..
        } = &mut *script;
        Self::next(statuses, last_status, "no status scripted")
    }

    async fn analysis_result(
        &self,
        _cred: &Credential,
        _id: &str,
    ) -> Result<AnalysisResult, BackendError> {
        self.calls.lock().unwrap().result += 1;
        let mut script = self.script.lock().unwrap();
        let Script {
            results,
            last_result,
            ..
        } = &mut *script;
        Self::next(results, last_result, "no result scripted")
    }
}
