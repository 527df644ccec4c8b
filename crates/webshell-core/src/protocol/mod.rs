//! Protocol modules.
//!
//! A single JSON envelope carries all four message kinds:
//! - `call`: web -> native (or native -> web) invocation with positional args.
//! - `result` / `error`: correlated replies, matched by `id`.
//! - `event`: one-way broadcast without correlation.
//!
//! Parsers are panic-free: malformed input is reported as `BridgeError`.

pub mod message;
