//! Shared application state.
//!
//! One `CoreState` per process, wrapped in `Arc` at startup and
//! handed to every handler through axum state. It owns the backend
//! handle and the tracker registry; handlers hold no state of their
//! own.

use std::sync::Arc;

use crate::analysis::TrackerRegistry;
use crate::backend::{BackendClient, BackendError, DicomBackend};
use crate::config::ServerConfig;

/// Outbound request timeout toward the imaging backend.
const BACKEND_TIMEOUT_SECS: u64 = 30;

pub struct CoreState {
    config: ServerConfig,
    backend: Arc<dyn DicomBackend>,
    trackers: TrackerRegistry,
}

impl CoreState {
    /// Build state for the configured backend URL.
    pub fn new(config: ServerConfig) -> Result<Self, BackendError> {
        let backend: Arc<dyn DicomBackend> =
            Arc::new(BackendClient::new(&config.backend_url, BACKEND_TIMEOUT_SECS)?);
        Ok(Self::with_backend(config, backend))
    }

    /// Build state over an arbitrary backend, used by tests with a
    /// scripted mock.
    pub fn with_backend(config: ServerConfig, backend: Arc<dyn DicomBackend>) -> Self {
        let trackers = TrackerRegistry::new(Arc::clone(&backend));
        Self {
            config,
            backend,
            trackers,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn DicomBackend> {
        &self.backend
    }

    pub fn trackers(&self) -> &TrackerRegistry {
        &self.trackers
    }
}
