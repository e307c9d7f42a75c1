//! Browser-facing HTTP surface.
//!
//! Routes are nested under `/api/`; everything else falls through to
//! the static UI assets. Handlers receive the shared
//! [`CoreState`](crate::core_state::CoreState) via axum `State` and
//! the caller's [`Credential`](crate::auth::Credential) via a request
//! extension installed by the credential middleware.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::gateway_router;
pub use server::GatewayServer;
