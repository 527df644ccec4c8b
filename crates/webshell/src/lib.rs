//! Top-level facade crate for webshell.
//!
//! Re-exports the wire protocol and the bridge library so applications can depend on a single crate.

pub mod core {
    pub use webshell_core::*;
}

pub mod bridge {
    pub use webshell_bridge::*;
}
