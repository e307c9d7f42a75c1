//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::backend::BackendError;

/// Structured error response body for the browser UI.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Backend rejected credentials")]
    Unauthorized,
    #[error("Imaging backend unreachable")]
    BackendUnavailable,
    #[error("Backend error {status}")]
    Upstream { status: u16, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Backend rejected credentials".to_string(),
            ),
            ApiError::BackendUnavailable => (
                StatusCode::BAD_GATEWAY,
                "BACKEND_UNREACHABLE",
                "Imaging backend unreachable".to_string(),
            ),
            ApiError::Upstream { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM",
                message.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Connection(_) | BackendError::Timeout => ApiError::BackendUnavailable,
            BackendError::Status { status: 401, .. } | BackendError::Status { status: 403, .. } => {
                ApiError::Unauthorized
            }
            BackendError::Status { status: 404, body } => ApiError::NotFound(if body.is_empty() {
                "Not found".to_string()
            } else {
                body
            }),
            BackendError::Status { status, body } => ApiError::Upstream {
                status,
                message: body,
            },
            BackendError::ResponseParsing(detail) | BackendError::HttpClient(detail) => {
                ApiError::Internal(detail)
            }
        }
    }
}
