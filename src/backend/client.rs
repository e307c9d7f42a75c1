//! HTTP client for the imaging backend.

use async_trait::async_trait;
use reqwest::RequestBuilder;

use super::{BackendError, DicomBackend, UploadPayload, WadoImage};
use crate::auth::Credential;
use crate::models::{
    AnalysisResult, AnalysisStatus, DicomFile, DicomListResponse, DownloadUrl,
};

/// Backend client over reqwest.
///
/// Stateless apart from the connection pool; credentials are attached
/// per call from the incoming request.
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BackendError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder, cred: &Credential) -> RequestBuilder {
        match cred.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_connect() {
            BackendError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::HttpClient(e.to_string())
        }
    }

    /// Send, surface non-2xx as `Status`, return the raw response.
    async fn send(
        &self,
        req: RequestBuilder,
        cred: &Credential,
    ) -> Result<reqwest::Response, BackendError> {
        let response = self
            .authorize(req, cred)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        cred: &Credential,
    ) -> Result<T, BackendError> {
        let response = self.send(self.client.get(self.url(path)), cred).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }
}

#[async_trait]
impl DicomBackend for BackendClient {
    async fn list_files(
        &self,
        cred: &Credential,
        page: u32,
        page_size: u32,
    ) -> Result<DicomListResponse, BackendError> {
        let path = format!("/api/dicom?page={page}&pageSize={page_size}");
        self.get_json(&path, cred).await
    }

    async fn get_file(&self, cred: &Credential, id: &str) -> Result<DicomFile, BackendError> {
        self.get_json(&format!("/api/dicom/{id}"), cred).await
    }

    async fn upload(
        &self,
        cred: &Credential,
        payload: UploadPayload,
    ) -> Result<DicomFile, BackendError> {
        let part = reqwest::multipart::Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&payload.content_type)
            .map_err(|e| BackendError::HttpClient(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let req = self.client.post(self.url("/api/dicom/upload")).multipart(form);
        let response = self.send(req, cred).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }

    async fn download_url(
        &self,
        cred: &Credential,
        id: &str,
    ) -> Result<DownloadUrl, BackendError> {
        self.get_json(&format!("/api/dicom/{id}/download"), cred).await
    }

    async fn wado_image(&self, cred: &Credential, id: &str) -> Result<WadoImage, BackendError> {
        let path = format!("/api/dicom/{id}/wado");
        let response = self.send(self.client.get(self.url(&path)), cred).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::HttpClient(e.to_string()))?;
        Ok(WadoImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn trigger_analysis(
        &self,
        cred: &Credential,
        id: &str,
    ) -> Result<AnalysisStatus, BackendError> {
        let req = self.client.post(self.url(&format!("/api/dicom/{id}/analyze")));
        let response = self.send(req, cred).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }

    async fn analysis_status(
        &self,
        cred: &Credential,
        id: &str,
    ) -> Result<AnalysisStatus, BackendError> {
        self.get_json(&format!("/api/dicom/{id}/analysis/status"), cred)
            .await
    }

    async fn analysis_result(
        &self,
        cred: &Credential,
        id: &str,
    ) -> Result<AnalysisResult, BackendError> {
        self.get_json(&format!("/api/dicom/{id}/analysis"), cred).await
    }
}
