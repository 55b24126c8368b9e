//! Relay message (JSON).
//!
//! `body` is kept as `RawValue` so the relay forwards application payloads
//! verbatim without ever parsing them.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{Result, RelayError};

/// Receiver sentinel meaning "every other connection".
pub const RECEIVER_ALL: &str = "all";

/// Message kind (field name is `type` in JSON).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// A connection joined the room.
    Connect,
    /// A connection left the room.
    Disconnect,
    /// Application payload.
    #[default]
    Data,
}

/// Relay payload exchanged with clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    /// Producing connection id. Always stamped by the server.
    #[serde(default)]
    pub sender: String,
    /// Target connection id or [`RECEIVER_ALL`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Message kind; clients may omit it for `data`.
    #[serde(rename = "type", default)]
    pub msg_type: MessageType,
    /// Opaque application payload, present only for `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Box<RawValue>>,
}

impl Message {
    /// Presence notice for a connection that just joined.
    pub fn connected(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            receiver: Some(RECEIVER_ALL.to_string()),
            msg_type: MessageType::Connect,
            body: None,
        }
    }

    /// Presence notice for a connection that just left.
    pub fn disconnected(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            receiver: None,
            msg_type: MessageType::Disconnect,
            body: None,
        }
    }

    /// Raw JSON text of the body, if any.
    pub fn body_json(&self) -> Option<&str> {
        self.body.as_deref().map(RawValue::get)
    }
}

/// Decode one inbound frame (UTF-8 JSON text or bytes).
pub fn decode(raw: impl AsRef<[u8]>) -> Result<Message> {
    serde_json::from_slice(raw.as_ref()).map_err(|e| RelayError::Decode(e.to_string()))
}

/// Encode a message for the wire.
pub fn encode(msg: &Message) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| RelayError::Internal(format!("json encode failed: {e}")))
}
