//! Bearer credential plumbing.
//!
//! The gateway never mints or validates tokens itself. It lifts the
//! `Authorization` header off each incoming request and forwards it
//! verbatim to the imaging backend, which owns identity. Requests
//! without a header are still served; the backend decides what an
//! anonymous caller may see.

use axum::http::HeaderMap;

/// Bearer token captured from an incoming request, if any.
///
/// Stored as the raw token (without the `Bearer ` prefix) so the
/// backend client can re-attach it uniformly. Debug output is
/// redacted so tokens never land in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Option<String>);

impl Credential {
    /// An explicitly anonymous credential.
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Extract from request headers. Malformed `Authorization` values
    /// (wrong scheme, empty token) are treated as anonymous rather
    /// than rejected; the backend is the authority on auth failures.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);
        Self(token)
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("Credential(bearer <redacted>)"),
            None => f.write_str("Credential(anonymous)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc123".parse().unwrap());
        let cred = Credential::from_headers(&headers);
        assert_eq!(cred.token(), Some("abc123"));
        assert!(!cred.is_anonymous());
    }

    #[test]
    fn missing_header_is_anonymous() {
        let cred = Credential::from_headers(&HeaderMap::new());
        assert!(cred.is_anonymous());
        assert_eq!(cred.token(), None);
    }

    #[test]
    fn wrong_scheme_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(Credential::from_headers(&headers).is_anonymous());
    }

    #[test]
    fn empty_token_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer   ".parse().unwrap());
        assert!(Credential::from_headers(&headers).is_anonymous());
    }

    #[test]
    fn debug_never_prints_token() {
        let cred = Credential::bearer("supersecret");
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("supersecret"));
    }
}
