//! Credential extraction middleware.
//!
//! Lifts the `Authorization` bearer token (if any) off the incoming
//! request and injects a [`Credential`] extension for handlers to
//! forward to the backend. Never rejects: the backend owns auth
//! decisions, the gateway just relays.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::Credential;

pub async fn extract(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let cred = Credential::from_headers(req.headers());
    req.extensions_mut().insert(cred);
    next.run(req).await
}
