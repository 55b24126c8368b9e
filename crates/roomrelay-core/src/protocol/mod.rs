//! Relay wire protocol.
//!
//! A single JSON message shape is used in both directions. Parsing is strict
//! (unknown fields are rejected) and panic-free: malformed input is reported
//! as `RelayError::Decode`.

pub mod message;

pub use message::{decode, encode, Message, MessageType, RECEIVER_ALL};
