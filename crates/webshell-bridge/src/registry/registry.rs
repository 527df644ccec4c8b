use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::value::RawValue;
use serde_json::Value;

use webshell_core::error::{BridgeError, ErrorCode, Result};
use webshell_core::protocol::message::{split_raw_args, Message, MessageType};

use super::handler::{DynamicBinding, Handler};
use super::signature::{ParamType, ReturnKind, Returned, Returns, Signature};

type Invoker = dyn Fn(&str, &[Box<RawValue>]) -> Result<Vec<Returned>> + Send + Sync;

/// A registered function plus the contract captured when it was bound.
pub struct BoundFunction {
    name: String,
    params: Vec<ParamType>,
    returns: Returns,
    invoker: Box<Invoker>,
}

impl BoundFunction {
    fn new(name: &str, params: Vec<ParamType>, kinds: &[ReturnKind], invoker: Box<Invoker>) -> Result<Self> {
        let returns = Returns::from_kinds(kinds).map_err(|reason| BridgeError::InvalidBinding {
            name: name.to_string(),
            reason: reason.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            params,
            returns,
            invoker,
        })
    }

    pub fn signature(&self) -> Signature {
        Signature {
            params: self.params.clone(),
            returns: self.returns,
        }
    }

    /// Run the function behind a panic boundary and normalize what it returned.
    fn invoke(&self, args: &[Box<RawValue>]) -> Result<Value> {
        let returned = catch_unwind(AssertUnwindSafe(|| (self.invoker)(&self.name, args)))
            .map_err(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::warn!(binding = %self.name, %message, "bound function panicked");
                BridgeError::Panicked {
                    name: self.name.clone(),
                    message,
                }
            })??;
        self.normalize(returned)
    }

    fn normalize(&self, returned: Vec<Returned>) -> Result<Value> {
        let fail = |message: String| BridgeError::Execution {
            name: self.name.clone(),
            message,
        };
        let mut returned = returned.into_iter();
        let out = match (self.returns, returned.next(), returned.next()) {
            (Returns::Nothing, None, None) => Ok(Value::Null),
            (Returns::Value, Some(Returned::Value(v)), None) => Ok(v),
            (Returns::Error, Some(Returned::Error(None)), None) => Ok(Value::Null),
            (Returns::Error, Some(Returned::Error(Some(e))), None) => Err(fail(e)),
            // the value is discarded whenever the error slot is set
            (Returns::ValueOrError, Some(_), Some(Returned::Error(Some(e)))) => Err(fail(e)),
            (Returns::ValueOrError, Some(Returned::Value(v)), Some(Returned::Error(None))) => Ok(v),
            (Returns::ValueOrError, Some(Returned::Error(None)), Some(Returned::Error(None))) => {
                Ok(Value::Null)
            }
            (shape, ..) => Err(fail(format!(
                "unexpected return values for declared shape {shape:?} (arity {})",
                shape.arity()
            ))),
        };
        if returned.next().is_some() {
            return Err(fail("unexpected number of return values".into()));
        }
        out
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Name -> function table with JSON argument marshaling.
///
/// Lookups clone an `Arc` snapshot and release the shard lock before the
/// function runs, so slow functions never block other callers and an
/// in-flight call survives a concurrent `unregister`.
#[derive(Default)]
pub struct Registry {
    funcs: DashMap<String, Arc<BoundFunction>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            funcs: DashMap::new(),
        }
    }

    /// Bind a typed native function under `name`.
    pub fn register<F, Args>(&self, name: &str, f: F) -> Result<()>
    where
        F: Handler<Args>,
        Args: 'static,
    {
        let invoker: Box<Invoker> = Box::new(move |name: &str, args: &[Box<RawValue>]| f.invoke(name, args));
        let bound = BoundFunction::new(name, F::params(), &F::returns(), invoker)?;
        self.insert(bound)
    }

    /// Bind a function whose contract is declared at runtime.
    pub fn register_dynamic(&self, name: &str, binding: DynamicBinding) -> Result<()> {
        let params = binding.params.clone();
        let kinds = binding.returns.clone();
        let invoker: Box<Invoker> =
            Box::new(move |name: &str, args: &[Box<RawValue>]| binding.invoke(name, args));
        let bound = BoundFunction::new(name, params, &kinds, invoker)?;
        self.insert(bound)
    }

    fn insert(&self, bound: BoundFunction) -> Result<()> {
        if bound.name.is_empty() {
            return Err(BridgeError::InvalidBinding {
                name: String::new(),
                reason: "name cannot be empty".into(),
            });
        }
        match self.funcs.entry(bound.name.clone()) {
            Entry::Occupied(_) => Err(BridgeError::DuplicateBinding(bound.name)),
            Entry::Vacant(slot) => {
                tracing::debug!(binding = %bound.name, params = bound.params.len(), returns = ?bound.returns, "function bound");
                slot.insert(Arc::new(bound));
                Ok(())
            }
        }
    }

    /// Remove a binding. Returns whether it existed.
    pub fn unregister(&self, name: &str) -> bool {
        let existed = self.funcs.remove(name).is_some();
        if existed {
            tracing::debug!(binding = %name, "function unbound");
        }
        existed
    }

    pub fn has(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// Registered names, in no particular order.
    pub fn list(&self) -> Vec<String> {
        self.funcs.iter().map(|e| e.key().clone()).collect()
    }

    pub fn signature(&self, name: &str) -> Option<Signature> {
        self.funcs.get(name).map(|e| e.value().signature())
    }

    /// Decode `raw_args`, invoke `name`, and normalize its return values.
    pub fn call(&self, name: &str, raw_args: Option<&RawValue>) -> Result<Value> {
        let bound = self
            .funcs
            .get(name)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| BridgeError::NotFound(name.to_string()))?;

        let args = split_raw_args(raw_args).map_err(|e| BridgeError::InvalidArgument {
            name: name.to_string(),
            reason: format!("failed to parse arguments: {e}"),
        })?;

        if args.len() != bound.params.len() {
            return Err(BridgeError::ArgumentCount {
                name: name.to_string(),
                expected: bound.params.len(),
                got: args.len(),
            });
        }

        bound.invoke(&args)
    }

    /// Full request/response wrapper: a call message in, a result or error message out.
    pub fn call_with_message(&self, msg: &Message) -> Message {
        if msg.msg_type != MessageType::Call {
            return Message::error(msg.id.clone(), ErrorCode::Unknown, "expected call message", "");
        }

        match self.call(&msg.method, msg.args.as_deref()) {
            Ok(result) => Message::result(msg.id.clone(), &result).unwrap_or_else(|e| {
                Message::error(msg.id.clone(), ErrorCode::Execution, "failed to serialize result", e.to_string())
            }),
            Err(BridgeError::Encode(details)) => {
                Message::error(msg.id.clone(), ErrorCode::Execution, "failed to serialize result", details)
            }
            Err(e) => {
                tracing::debug!(id = %msg.id, method = %msg.method, error = %e, "call failed");
                Message::error(msg.id.clone(), e.error_code(), e.to_string(), "")
            }
        }
    }
}
