//! Shared application state for the roomRelay gateway.

use std::sync::Arc;

use roomrelay_core::error::Result;

use crate::config::RelayConfig;
use crate::obs::RelayMetrics;
use crate::relay::{ConnectionRegistry, RelayHandler};
use crate::transport::handshake::OriginPolicy;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    relay: Arc<RelayHandler>,
    metrics: Arc<RelayMetrics>,
}

struct AppStateInner {
    cfg: RelayConfig,
    origins: OriginPolicy,
}

impl AppState {
    /// Build application state from a config that has not necessarily been
    /// validated yet.
    pub fn new(cfg: RelayConfig) -> Result<Self> {
        cfg.validate()?;

        let origins = OriginPolicy::new(&cfg.relay.allowed_origins);
        let metrics = Arc::new(RelayMetrics::default());
        let registry = Arc::new(ConnectionRegistry::new());
        let relay = Arc::new(RelayHandler::new(registry, Arc::clone(&metrics)));

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, origins }),
            relay,
            metrics,
        })
    }

    pub fn cfg(&self) -> &RelayConfig {
        &self.inner.cfg
    }

    pub fn origins(&self) -> &OriginPolicy {
        &self.inner.origins
    }

    pub fn relay(&self) -> Arc<RelayHandler> {
        Arc::clone(&self.relay)
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }
}
