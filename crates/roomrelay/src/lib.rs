//! Top-level facade crate for roomRelay.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use roomrelay_core::*;
}

pub mod gateway {
    pub use roomrelay_gateway::*;
}
