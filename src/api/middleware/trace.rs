//! Request tracing middleware.
//!
//! Assigns each request an id (honoring an incoming `X-Request-Id`),
//! echoes it on the response, and logs one access line with method,
//! path, status, and duration.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::Instant;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn log_request(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(RequestId(request_id.clone()));

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = elapsed.as_millis() as u64,
        "request"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Request id carried through extensions for handlers that log.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);
