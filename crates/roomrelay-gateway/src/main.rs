//! roomRelay gateway
//!
//! - WebSocket endpoint: /room (configurable)
//! - Connect / disconnect presence fan-out, direct-echo data relay
//! - Tracing span per connection
//! - Keepalive ping

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use roomrelay_core::error::{RelayError, Result};
use roomrelay_gateway::{app_state, config};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var(config::CONFIG_ENV)
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_or_default(&path)?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| RelayError::Config(format!("gateway.listen: {e}")))?;

    let state = app_state::AppState::new(cfg)?;

    tracing::info!(%listen, path = %state.cfg().relay.path, "roomrelay-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| RelayError::Internal(format!("bind {listen} failed: {e}")))?;

    roomrelay_gateway::serve(listener, state).await
}
