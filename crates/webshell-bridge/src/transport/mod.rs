//! Transport layer for the development host.
//!
//! A browser tab connected over WebSocket stands in for the native web
//! surface: it posts bridge messages up and evaluates scripts sent down.

pub mod codec;
pub mod hub;
pub mod ws;
