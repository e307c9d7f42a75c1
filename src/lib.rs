pub mod analysis; // tracker state machine + view projection
pub mod api; // browser-facing HTTP surface
pub mod auth;
pub mod backend; // imaging backend client + mock
pub mod config;
pub mod core_state;
pub mod models; // backend wire contract

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Initialize tracing from `RUST_LOG`, with a sane default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Start the gateway and run until Ctrl-C.
pub async fn run() -> Result<(), String> {
    let config = config::ServerConfig::from_env();
    tracing::info!(
        backend_url = %config.backend_url,
        bind_addr = %config.bind_addr,
        "Medsight starting v{}",
        config::APP_VERSION
    );

    let core = Arc::new(
        core_state::CoreState::new(config).map_err(|e| format!("backend client: {e}"))?,
    );
    let mut server = api::GatewayServer::start(core).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("signal handler: {e}"))?;
    tracing::info!("Shutdown requested");
    server.shutdown();
    Ok(())
}
