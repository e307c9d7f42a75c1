//! Gateway configuration.
//!
//! Everything comes from the environment with sensible local-dev
//! defaults; there is no config file. The one hard constant is the
//! analysis poll interval, which the UI contract depends on.

use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Medsight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Interval between analysis status polls while a run is active.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// Largest DICOM upload the gateway will relay (100 MiB).
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Default `RUST_LOG` filter when the env var is unset.
pub fn default_log_filter() -> &'static str {
    "medsight=info,tower_http=warn"
}

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_UI_DIR: &str = "ui";

/// Runtime configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the gateway listens on (`MEDSIGHT_BIND`).
    pub bind_addr: String,
    /// Base URL of the imaging backend (`MEDSIGHT_BACKEND_URL`).
    pub backend_url: String,
    /// Directory of static UI assets (`MEDSIGHT_UI_DIR`).
    pub ui_dir: String,
    /// Extra origins allowed by CORS, comma-separated
    /// (`MEDSIGHT_CORS_ORIGINS`). Empty in production setups where
    /// the UI is served from this same process.
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let backend_url = std::env::var("MEDSIGHT_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        Self {
            bind_addr: std::env::var("MEDSIGHT_BIND")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            // Trailing slashes break path joining downstream.
            backend_url: backend_url.trim_end_matches('/').to_string(),
            ui_dir: std::env::var("MEDSIGHT_UI_DIR")
                .unwrap_or_else(|_| DEFAULT_UI_DIR.to_string()),
            cors_origins: std::env::var("MEDSIGHT_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            ui_dir: DEFAULT_UI_DIR.to_string(),
            cors_origins: Vec::new(),
        }
    }
}
