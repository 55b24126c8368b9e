//! roomRelay core: transport-agnostic wire message, codec, and error types.
//!
//! This crate defines the relay payload and the error surface shared by the
//! gateway and its tests. It carries no transport or runtime dependencies so
//! the wire contract can be exercised without a socket.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! Malformed client input always surfaces as `RelayError::Decode`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{Result, RelayError};
