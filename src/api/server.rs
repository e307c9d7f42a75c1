//! Gateway server lifecycle.
//!
//! Binds the configured address, mounts `gateway_router()`, and runs
//! until shut down. Pattern: bind → spawn background task → return a
//! handle with a shutdown channel. Shutdown also deactivates every
//! analysis tracker so no poll loop outlives the server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::api::router::gateway_router;
use crate::core_state::CoreState;

/// Handle to a running gateway server.
pub struct GatewayServer {
    addr: SocketAddr,
    core: Arc<CoreState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl GatewayServer {
    /// Bind `state.config().bind_addr` and start serving in a
    /// background task.
    pub async fn start(core: Arc<CoreState>) -> Result<Self, String> {
        Self::start_on(core.clone(), &core.config().bind_addr.clone()).await
    }

    /// Start on an explicit address. Tests pass `127.0.0.1:0` for an
    /// ephemeral port.
    pub async fn start_on(core: Arc<CoreState>, bind_addr: &str) -> Result<Self, String> {
        let listener = tokio::net::TcpListener::bind(bind_addr)
            .await
            .map_err(|e| format!("Failed to bind {bind_addr}: {e}"))?;
        let addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to get server address: {e}"))?;

        let app = gateway_router(Arc::clone(&core));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let shutdown_signal = async move {
                let _ = shutdown_rx.await;
                tracing::info!("Gateway server received shutdown signal");
            };

            tracing::info!(%addr, "Gateway server started");

            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal)
                .await
            {
                tracing::error!("Gateway server error: {e}");
            }

            tracing::info!("Gateway server stopped");
        });

        Ok(Self {
            addr,
            core,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shut down gracefully and stop all analysis trackers.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.core.trackers().deactivate_all();
    }
}
