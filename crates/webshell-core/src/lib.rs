//! webshell core: transport-agnostic wire protocol and error types.
//!
//! This crate defines the message envelope exchanged between native code and
//! the embedded web surface, plus the error surface shared by the bridge and
//! the host. It intentionally carries no runtime or UI dependencies so it can
//! be reused by any transport (webview IPC, WebSocket, native messaging).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed input surfaces as `BridgeError`/`Result` so a hostile page cannot
//! crash the native process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{BridgeError, ErrorCode, Result};
pub use protocol::message::{ErrorPayload, Message, MessageType};
