//! Axum router wiring (HTTP -> WS upgrade).
//!
//! Exposes the room endpoint (default `/room`) plus `/metrics` and `/healthz`.

use axum::{extract::State, routing::get, Router};

use crate::{app_state::AppState, transport};

async fn metrics(State(app): State<AppState>) -> String {
    app.metrics().render()
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn build_router(state: AppState) -> Router {
    let path = state.cfg().relay.path.clone();
    Router::new()
        .route(&path, get(transport::ws::ws_upgrade))
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .with_state(state)
}
