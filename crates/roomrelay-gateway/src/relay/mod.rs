//! Single-room relay: connection registry plus lifecycle fan-out.

pub mod handler;
pub mod registry;

pub use handler::{Fanout, RelayHandler};
pub use registry::{Connection, ConnectionRegistry};
