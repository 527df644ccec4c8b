//! Function registry: the dynamic call-dispatch core.
//!
//! Re-exports the registry, the typed/dynamic binding adapters and the
//! signature descriptors so downstream consumers can depend on this module
//! directly.

pub mod handler;
pub mod registry;
pub mod reply;
pub mod signature;

pub use handler::{DynamicBinding, Handler};
pub use registry::{BoundFunction, Registry};
pub use reply::{Json, Reply};
pub use signature::{ParamType, ReturnKind, Returned, Returns, Signature};
