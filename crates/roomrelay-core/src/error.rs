//! Shared error type across roomRelay crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed inbound payload.
    BadPayload,
    /// Recipient could not be reached.
    Unreachable,
    /// Invalid configuration.
    BadConfig,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON error frames.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadPayload => "BAD_PAYLOAD",
            ClientCode::Unreachable => "UNREACHABLE",
            ClientCode::BadConfig => "BAD_CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and gateway.
///
/// A lookup miss in the connection registry is not an error; it is modelled
/// as `Option::None` and dropped silently by the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound payload could not be decoded into a relay message.
    #[error("decode failed: {0}")]
    Decode(String),
    /// Push to a single recipient failed (closed or saturated connection).
    #[error("send to {id} failed: {reason}")]
    Send { id: String, reason: SendFailure },
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

/// Why a per-recipient send failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailure {
    /// The connection's outbound queue is gone.
    Closed,
    /// The connection's outbound queue is full.
    Full,
}

impl SendFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            SendFailure::Closed => "closed",
            SendFailure::Full => "full",
        }
    }
}

impl std::fmt::Display for SendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RelayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RelayError::Decode(_) => ClientCode::BadPayload,
            RelayError::Send { .. } => ClientCode::Unreachable,
            RelayError::Config(_) => ClientCode::BadConfig,
            RelayError::Internal(_) => ClientCode::Internal,
        }
    }
}
