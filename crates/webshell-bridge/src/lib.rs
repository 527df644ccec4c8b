//! Native <-> web bridge for webview application shells.
//!
//! The [`Bridge`] owns a registry of native functions the page can call,
//! routes JSON messages in both directions, and reaches the page only through
//! an [`Evaluator`]. The remaining modules make up `webshell-host`, a
//! development host that serves the page over HTTP and carries bridge
//! traffic on a WebSocket.

pub mod app_state;
pub mod bridge;
pub mod config;
pub mod demo;
pub mod eval;
pub mod ops;
pub mod page;
pub mod registry;
pub mod router;
pub mod script;
pub mod transport;
pub mod window;

pub use bridge::{Bridge, BridgeOptions, ListenerId};
pub use eval::{ChannelEvaluator, Evaluator};
pub use registry::{DynamicBinding, Json, ParamType, Registry, ReturnKind, Returned};
pub use window::{Window, WindowConfig, WindowEvent, WindowTable};
