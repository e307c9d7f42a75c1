//! API endpoint handlers.
//!
//! Each module corresponds to one area of the browser UI. Handlers
//! are thin: they forward to the backend client or the tracker
//! registry and map errors through [`ApiError`](super::ApiError).

pub mod analysis;
pub mod files;
pub mod health;
pub mod viewer;
