//! Calling contract captured at registration time.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use serde_json::Value;

/// Decoder that checks one raw argument against a declared parameter type.
type CheckFn = fn(&RawValue) -> Result<Value, serde_json::Error>;

fn check<T: DeserializeOwned>(raw: &RawValue) -> Result<Value, serde_json::Error> {
    serde_json::from_str::<T>(raw.get())?;
    serde_json::from_str(raw.get())
}

/// Descriptor for one positional parameter.
#[derive(Clone, Copy)]
pub struct ParamType {
    type_name: &'static str,
    check: CheckFn,
}

impl ParamType {
    /// Descriptor for a parameter that must decode into `T`.
    pub fn of<T: DeserializeOwned>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            check: check::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Validate `raw` against this parameter's type, returning it as a `Value`.
    pub fn decode(&self, raw: &RawValue) -> Result<Value, serde_json::Error> {
        (self.check)(raw)
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParamType").field(&self.type_name).finish()
    }
}

impl PartialEq for ParamType {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

/// One declared return slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// A JSON-encodable value, named for diagnostics.
    Value(&'static str),
    /// An error indicator (`None` = success).
    Error,
}

/// Validated return shape. At most two slots; a pair always ends in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {
    Nothing,
    Value,
    Error,
    ValueOrError,
}

impl Returns {
    /// Classify declared return slots, rejecting shapes the dispatcher cannot normalize.
    pub fn from_kinds(kinds: &[ReturnKind]) -> Result<Self, &'static str> {
        match kinds {
            [] => Ok(Returns::Nothing),
            [ReturnKind::Error] => Ok(Returns::Error),
            [ReturnKind::Value(_)] => Ok(Returns::Value),
            [_, ReturnKind::Error] => Ok(Returns::ValueOrError),
            [_, ReturnKind::Value(_)] => Err("second return value must be error"),
            _ => Err("too many return values (max 2)"),
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Returns::Nothing => 0,
            Returns::Value | Returns::Error => 1,
            Returns::ValueOrError => 2,
        }
    }

    pub fn has_error(self) -> bool {
        matches!(self, Returns::Error | Returns::ValueOrError)
    }
}

/// What a bound function actually produced for one return slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Returned {
    Value(Value),
    /// `None` means "no error".
    Error(Option<String>),
}

/// Public view of a binding's contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<ParamType>,
    pub returns: Returns,
}
