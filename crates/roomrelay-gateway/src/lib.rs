//! roomRelay gateway library entry.
//!
//! Wires the WebSocket transport, the connection registry, and the relay
//! handler into a single-room relay server. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod relay;
pub mod router;
pub mod transport;

use roomrelay_core::error::{RelayError, Result};

/// Serve the relay on an already-bound listener until the server fails.
pub async fn serve(listener: tokio::net::TcpListener, state: app_state::AppState) -> Result<()> {
    let app = router::build_router(state);
    axum::serve(listener, app)
        .await
        .map_err(|e| RelayError::Internal(format!("server failed: {e}")))
}
