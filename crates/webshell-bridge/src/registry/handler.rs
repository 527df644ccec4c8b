//! Adapters that turn native functions into type-erased invokers.
//!
//! Typed functions go through [`Handler`], implemented for every
//! `Fn(A1, .., An) -> R` up to eight parameters. Functions whose signature is
//! only known at runtime go through [`DynamicBinding`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use serde_json::Value;

use webshell_core::error::{BridgeError, Result};

use super::reply::Reply;
use super::signature::{ParamType, ReturnKind, Returned};

/// A native function callable through the registry. `Args` is a tuple of the
/// parameter types and only exists to keep the per-arity impls apart.
pub trait Handler<Args>: Send + Sync + 'static {
    fn params() -> Vec<ParamType>;
    fn returns() -> Vec<ReturnKind>;
    /// Decode `args` (already checked for count) and run the function.
    fn invoke(&self, name: &str, args: &[Box<RawValue>]) -> Result<Vec<Returned>>;
}

pub(crate) fn decode_arg<T: DeserializeOwned>(
    name: &str,
    index: usize,
    raw: Option<&RawValue>,
) -> Result<T> {
    let raw = raw.ok_or_else(|| BridgeError::InvalidArgument {
        name: name.to_string(),
        reason: format!("missing argument {index}"),
    })?;
    serde_json::from_str(raw.get()).map_err(|e| BridgeError::ArgumentType {
        name: name.to_string(),
        index,
        type_name: std::any::type_name::<T>(),
        reason: e.to_string(),
    })
}

fn encode_failed(e: serde_json::Error) -> BridgeError {
    BridgeError::Encode(e.to_string())
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<F, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: Reply,
            $($ty: DeserializeOwned + 'static,)*
        {
            fn params() -> Vec<ParamType> {
                vec![$(ParamType::of::<$ty>()),*]
            }

            fn returns() -> Vec<ReturnKind> {
                R::kinds()
            }

            fn invoke(&self, name: &str, args: &[Box<RawValue>]) -> Result<Vec<Returned>> {
                let mut slots = args.iter().map(|b| &**b).enumerate();
                $(
                    let $ty = {
                        let (index, raw) = slots.next().map_or((args.len(), None), |(i, r)| (i, Some(r)));
                        decode_arg::<$ty>(name, index, raw)?
                    };
                )*
                (self)($($ty),*).into_returned().map_err(encode_failed)
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);

type DynFn = dyn Fn(Vec<Value>) -> Vec<Returned> + Send + Sync;

/// Explicit adapter for a function whose contract is declared at runtime
/// (scripted plugins, generated bindings). Arguments arrive as `Value`s that
/// already passed their [`ParamType`] check.
#[derive(Clone)]
pub struct DynamicBinding {
    pub params: Vec<ParamType>,
    pub returns: Vec<ReturnKind>,
    func: Arc<DynFn>,
}

impl DynamicBinding {
    pub fn new<F>(params: Vec<ParamType>, returns: Vec<ReturnKind>, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Vec<Returned> + Send + Sync + 'static,
    {
        Self {
            params,
            returns,
            func: Arc::new(func),
        }
    }

    pub(crate) fn invoke(&self, name: &str, args: &[Box<RawValue>]) -> Result<Vec<Returned>> {
        let mut values = Vec::with_capacity(self.params.len());
        for (index, (param, raw)) in self.params.iter().zip(args).enumerate() {
            let v = param.decode(raw).map_err(|e| BridgeError::ArgumentType {
                name: name.to_string(),
                index,
                type_name: param.type_name(),
                reason: e.to_string(),
            })?;
            values.push(v);
        }
        Ok((self.func)(values))
    }
}
