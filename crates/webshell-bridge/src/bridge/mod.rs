//! Bridge coordinator: wires the registry to a script-evaluation capability
//! and routes messages in both directions.

pub mod bridge;
pub mod listeners;
pub mod pending;

pub use bridge::{Bridge, BridgeOptions};
pub use listeners::{EventListeners, Listener, ListenerId};
pub use pending::{PendingCalls, PendingGuard};
