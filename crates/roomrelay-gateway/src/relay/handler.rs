use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message as WsMessage};

use roomrelay_core::error::{RelayError, Result};
use roomrelay_core::protocol::{decode, encode, Message};

use crate::obs::RelayMetrics;
use crate::relay::registry::{Connection, ConnectionRegistry};

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fanout {
    pub delivered: usize,
    pub failed: usize,
}

/// Relay handler: turns per-connection lifecycle events into registry
/// updates and fan-out.
///
/// Every method is safe to call concurrently from independent session tasks.
/// Events of a single connection must arrive in order (connect, messages,
/// disconnect); the session loop in `transport::ws` guarantees that.
pub struct RelayHandler {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RelayMetrics>,
}

impl RelayHandler {
    pub fn new(registry: Arc<ConnectionRegistry>, metrics: Arc<RelayMetrics>) -> Self {
        Self { registry, metrics }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Register `id` then announce it to everyone else in the room.
    pub fn on_connect(&self, id: &str, conn: Connection) -> Result<Fanout> {
        if self.registry.register(id, conn).is_none() {
            self.metrics.connections_active.inc();
        }
        self.metrics.connects.inc(&[]);

        let fanout = self.broadcast(&Message::connected(id), Some(id))?;
        tracing::info!(
            conn = %id,
            peers = fanout.delivered + fanout.failed,
            failed = fanout.failed,
            "connected"
        );
        Ok(fanout)
    }

    /// Decode a client frame and echo it back to its own sender.
    ///
    /// `receiver` is carried through but not used for routing. Returns
    /// `Ok(true)` when the echo was queued, `Ok(false)` when it was dropped
    /// (sender gone, closed, or saturated). A `Decode` error leaves the
    /// registry untouched and sends nothing.
    pub fn on_message(&self, id: &str, raw: &[u8]) -> Result<bool> {
        let mut msg = match decode(raw) {
            Ok(m) => m,
            Err(e) => {
                self.metrics.decode_errors.inc(&[]);
                tracing::debug!(conn = %id, error = %e, "inbound payload rejected");
                return Err(e);
            }
        };
        msg.sender = id.to_string();

        let Some(conn) = self.registry.get(id) else {
            return Ok(false);
        };
        if !conn.is_open() {
            return Ok(false);
        }

        let text = encode(&msg)?;
        match conn.send(WsMessage::Text(text)) {
            Ok(()) => {
                self.metrics.echoes.inc(&[]);
                Ok(true)
            }
            Err(reason) => {
                self.metrics.send_failures.inc(&[("kind", reason.as_str())]);
                tracing::warn!(conn = %id, %reason, "echo dropped");
                Ok(false)
            }
        }
    }

    /// Unregister `id` then tell every remaining connection it left.
    pub fn on_disconnect(&self, id: &str, close: Option<&CloseFrame<'_>>) -> Result<Fanout> {
        if self.registry.unregister(id).is_some() {
            self.metrics.connections_active.dec();
        }
        self.metrics.disconnects.inc(&[]);

        let fanout = self.broadcast(&Message::disconnected(id), None)?;
        tracing::info!(
            conn = %id,
            close_code = close.map(|c| c.code),
            peers = fanout.delivered + fanout.failed,
            failed = fanout.failed,
            "disconnected"
        );
        Ok(fanout)
    }

    /// Transport errors are observed only. The transport closes the session
    /// afterwards, which arrives here as `on_disconnect`.
    pub fn on_transport_error(&self, id: &str, error: &dyn std::error::Error) {
        tracing::debug!(conn = %id, %error, "transport error");
    }

    /// Encode once, then push to every registered connection except `skip`.
    /// A failing recipient never stops the loop.
    fn broadcast(&self, msg: &Message, skip: Option<&str>) -> Result<Fanout> {
        let text = encode(msg)?;
        let mut fanout = Fanout::default();

        for (peer, conn) in self.registry.snapshot() {
            if skip == Some(peer.as_str()) {
                continue;
            }
            match conn.send(WsMessage::Text(text.clone())) {
                Ok(()) => fanout.delivered += 1,
                Err(reason) => {
                    fanout.failed += 1;
                    self.metrics.send_failures.inc(&[("kind", reason.as_str())]);
                    let err = RelayError::Send { id: peer, reason };
                    tracing::warn!(error = %err, "broadcast send failed");
                }
            }
        }

        Ok(fanout)
    }
}
