//! Return-shape classification for typed bindings.
//!
//! `Reply` is implemented for a closed set of return types instead of every
//! `Serialize`, so `Result<T, E>` is never ambiguous with "a serializable
//! value". Arbitrary structs go through [`Json`].

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::signature::{ReturnKind, Returned};

/// Return types a bound function may have.
pub trait Reply {
    /// Declared return slots.
    fn kinds() -> Vec<ReturnKind>;
    /// Produced return slots. Fails only if a value cannot be encoded.
    fn into_returned(self) -> Result<Vec<Returned>, serde_json::Error>;
}

/// Wrapper for returning any `Serialize` type as a single value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Serialize for Json<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl Reply for () {
    fn kinds() -> Vec<ReturnKind> {
        Vec::new()
    }

    fn into_returned(self) -> Result<Vec<Returned>, serde_json::Error> {
        Ok(Vec::new())
    }
}

fn single<T: Serialize>(value: &T) -> Result<Vec<Returned>, serde_json::Error> {
    Ok(vec![Returned::Value(serde_json::to_value(value)?)])
}

macro_rules! impl_reply_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reply for $ty {
                fn kinds() -> Vec<ReturnKind> {
                    vec![ReturnKind::Value(std::any::type_name::<$ty>())]
                }

                fn into_returned(self) -> Result<Vec<Returned>, serde_json::Error> {
                    single(&self)
                }
            }
        )*
    };
}

impl_reply_value!(
    bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
    String, &'static str, Value,
);

macro_rules! impl_reply_generic {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<T: Serialize> Reply for $ty {
                fn kinds() -> Vec<ReturnKind> {
                    vec![ReturnKind::Value(std::any::type_name::<$ty>())]
                }

                fn into_returned(self) -> Result<Vec<Returned>, serde_json::Error> {
                    single(&self)
                }
            }
        )*
    };
}

impl_reply_generic!(Json<T>, Vec<T>, Option<T>, HashMap<String, T>, BTreeMap<String, T>);

/// `Result<(), E>` is a lone error indicator; any other `Result<T, E>` is a
/// value-plus-error pair.
impl<T, E> Reply for Result<T, E>
where
    T: Serialize + 'static,
    E: Display,
{
    fn kinds() -> Vec<ReturnKind> {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            vec![ReturnKind::Error]
        } else {
            vec![ReturnKind::Value(std::any::type_name::<T>()), ReturnKind::Error]
        }
    }

    fn into_returned(self) -> Result<Vec<Returned>, serde_json::Error> {
        let unit = TypeId::of::<T>() == TypeId::of::<()>();
        match self {
            Ok(_) if unit => Ok(vec![Returned::Error(None)]),
            Err(e) if unit => Ok(vec![Returned::Error(Some(e.to_string()))]),
            Ok(v) => Ok(vec![
                Returned::Value(serde_json::to_value(&v)?),
                Returned::Error(None),
            ]),
            Err(e) => Ok(vec![Returned::Value(Value::Null), Returned::Error(Some(e.to_string()))]),
        }
    }
}
