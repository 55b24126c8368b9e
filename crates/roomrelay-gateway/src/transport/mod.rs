//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler, the pre-upgrade origin guard, and the
//! frame classifier that feeds the relay handler.

pub mod codec;
pub mod handshake;
pub mod ws;
