//! Gateway router.
//!
//! Returns a composable `Router` that can be mounted on any axum
//! server. API routes are nested under `/api/`; every other path
//! serves the static UI assets.
//!
//! Middleware stack (outermost → innermost):
//! 1. Trace (request id + access log) → 2. Credential extraction

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::middleware;
use crate::config::MAX_UPLOAD_BYTES;
use crate::core_state::CoreState;

/// Build the gateway router over shared state.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
/// Static segments (`stats`, `upload`) take precedence over `:id`.
pub fn gateway_router(state: Arc<CoreState>) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/dicom", get(endpoints::files::list))
        .route("/dicom/stats", get(endpoints::files::stats))
        .route("/dicom/upload", post(endpoints::files::upload))
        .route("/dicom/:id", get(endpoints::files::detail))
        .route("/dicom/:id/download", get(endpoints::files::download))
        .route("/dicom/:id/wado", get(endpoints::viewer::wado))
        .route("/dicom/:id/analyze", post(endpoints::analysis::trigger))
        .route("/dicom/:id/analysis", get(endpoints::analysis::view))
        .route(
            "/dicom/:id/analysis/track",
            post(endpoints::analysis::track_start).delete(endpoints::analysis::track_stop),
        )
        .with_state(Arc::clone(&state))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Credential runs under trace so the access line covers it.
        .layer(axum::middleware::from_fn(middleware::credential::extract))
        .layer(axum::middleware::from_fn(middleware::trace::log_request));

    let ui = ServeDir::new(&state.config().ui_dir).append_index_html_on_directories(true);

    let mut router = Router::new().nest("/api", api).fallback_service(ui);

    let origins: Vec<HeaderValue> = state
        .config()
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    if !origins.is_empty() {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use tower::ServiceExt;

    use crate::backend::mock::{status, MockBackend};
    use crate::backend::DicomBackend;
    use crate::config::ServerConfig;
    use crate::models::{AnalysisState, DicomFile};

    fn test_state_with(mock: MockBackend) -> (Arc<CoreState>, Arc<MockBackend>) {
        let mock = Arc::new(mock);
        let state = Arc::new(CoreState::with_backend(
            ServerConfig::default(),
            mock.clone(),
        ));
        (state, mock)
    }

    fn sample_file(id: &str) -> DicomFile {
        DicomFile {
            id: id.to_string(),
            file_name: format!("{id}.dcm"),
            patient_name: Some("Jane Doe".into()),
            patient_id: Some("PAT-7".into()),
            study_date: None,
            modality: Some("CT".into()),
            file_size: 4096,
            uploaded_at: Utc::now(),
            description: None,
            series_description: None,
            study_description: None,
            dimensions: None,
        }
    }

    fn make_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_response_shape() {
        let (state, _) = test_state_with(MockBackend::new());
        let app = gateway_router(state);

        let response = app.oneshot(make_request("GET", "/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
        assert_eq!(json["activeTrackers"], 0);
    }

    #[tokio::test]
    async fn list_passes_through_backend_files() {
        let (state, _) =
            test_state_with(MockBackend::new().with_files(vec![sample_file("f1"), sample_file("f2")]));
        let app = gateway_router(state);

        let response = app.oneshot(make_request("GET", "/api/dicom")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["files"][0]["fileName"], "f1.dcm");
        assert_eq!(json["pageSize"], 50);
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let (state, _) = test_state_with(MockBackend::new());
        let app = gateway_router(state);

        let response = app
            .oneshot(make_request("GET", "/api/dicom?pageSize=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn stats_response_shape() {
        let (state, _) = test_state_with(MockBackend::new().with_files(vec![sample_file("f1")]));
        let app = gateway_router(state);

        let response = app
            .oneshot(make_request("GET", "/api/dicom/stats"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["totalFiles"], 1);
        assert_eq!(json["recentUploads"], 1);
        assert_eq!(json["storageUsed"], "4.0 KB");
    }

    #[tokio::test]
    async fn unknown_file_returns_structured_404() {
        let (state, _) = test_state_with(MockBackend::new());
        let app = gateway_router(state);

        let response = app
            .oneshot(make_request("GET", "/api/dicom/missing"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn upload_relays_multipart_file() {
        let (state, mock) = test_state_with(MockBackend::new());
        let app = gateway_router(state);

        let boundary = "medsight-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"chest.dcm\"\r\n\
             Content-Type: application/dicom\r\n\r\n\
             DICMDATA\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/dicom/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["fileName"], "chest.dcm");

        let listed = mock
            .list_files(&crate::auth::Credential::anonymous(), 1, 50)
            .await
            .unwrap();
        assert_eq!(listed.total, 1);
    }

    #[tokio::test]
    async fn upload_without_file_part_is_rejected() {
        let (state, _) = test_state_with(MockBackend::new());
        let app = gateway_router(state);

        let boundary = "medsight-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"other\"\r\n\r\n\
             hello\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/dicom/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wado_proxies_bytes_with_content_type() {
        let (state, _) = test_state_with(MockBackend::new());
        let app = gateway_router(state);

        let response = app
            .oneshot(make_request("GET", "/api/dicom/f1/wado"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
        assert_eq!(response.headers().get("cache-control").unwrap(), "no-store");
    }

    #[tokio::test]
    async fn download_passes_presigned_url_through() {
        let (state, _) = test_state_with(MockBackend::new());
        let app = gateway_router(state);

        let response = app
            .oneshot(make_request("GET", "/api/dicom/f1/download"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["url"], "https://storage.example/f1");
        assert_eq!(json["fileName"], "f1.dcm");
        assert!(json["expiresIn"].is_number());
    }

    #[tokio::test]
    async fn tracking_lifecycle_over_http() {
        let (state, _) = test_state_with(MockBackend::new());
        let app = gateway_router(Arc::clone(&state));

        // Activate.
        let response = app
            .clone()
            .oneshot(make_request("POST", "/api/dicom/f1/analysis/track"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["view"], "notStarted");
        assert_eq!(state.trackers().active_count(), 1);

        // Deactivate.
        let response = app
            .clone()
            .oneshot(make_request("DELETE", "/api/dicom/f1/analysis/track"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.trackers().active_count(), 0);
    }

    #[tokio::test]
    async fn view_read_never_activates_tracking() {
        let (state, mock) = test_state_with(MockBackend::new());
        let app = gateway_router(Arc::clone(&state));

        let response = app
            .oneshot(make_request("GET", "/api/dicom/f1/analysis"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["view"], "notStarted");
        assert_eq!(json["triggerEnabled"], true);
        assert_eq!(state.trackers().active_count(), 0);
        assert_eq!(mock.status_calls(), 0);
    }

    #[tokio::test]
    async fn trigger_starts_tracking_and_reports_progress() {
        let mock = MockBackend::new();
        mock.push_trigger(status("f1", AnalysisState::Pending));
        let (state, mock) = test_state_with(mock);
        let app = gateway_router(Arc::clone(&state));

        let response = app
            .oneshot(make_request("POST", "/api/dicom/f1/analyze"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["view"], "inProgress");
        assert_eq!(json["phase"], "queued");
        assert_eq!(mock.trigger_calls(), 1);
        assert_eq!(state.trackers().active_count(), 1);
    }

    #[tokio::test]
    async fn unknown_api_route_is_404() {
        let (state, _) = test_state_with(MockBackend::new());
        let app = gateway_router(state);

        let response = app
            .oneshot(make_request("GET", "/api/nonexistent"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
