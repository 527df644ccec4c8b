//! Bridge message envelope (JSON).
//!
//! Payload fields (`args`, `result`, `data`) are stored as `RawValue` so the
//! registry can decode each argument straight into the bound function's
//! parameter type without an intermediate `Value` tree.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{BridgeError, ErrorCode, Result};

/// Message kind (field name is `type` in JSON).
///
/// Unrecognized strings decode into `Unknown` instead of failing, so the
/// dispatcher can answer with a structured error that keeps the correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    Call,
    Result,
    Error,
    Event,
    Unknown(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::Call => "call",
            MessageType::Result => "result",
            MessageType::Error => "error",
            MessageType::Event => "event",
            MessageType::Unknown(s) => s,
        }
    }
}

impl From<String> for MessageType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "call" => MessageType::Call,
            "result" => MessageType::Result,
            "error" => MessageType::Error,
            "event" => MessageType::Event,
            _ => MessageType::Unknown(s),
        }
    }
}

impl From<MessageType> for String {
    fn from(t: MessageType) -> Self {
        match t {
            MessageType::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error carried by `type: "error"` messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

impl ErrorPayload {
    /// Standard code, `Unknown` for anything outside the closed set.
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from_i32(self.code)
    }
}

/// Wire envelope shared by both directions.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    /// Correlation id. Empty for broadcast events.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    /// Function name (call only).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    /// Raw JSON argument array (call only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Box<RawValue>>,
    /// Raw JSON success value (result only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    /// Event name (event only).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub event: String,
    /// Raw JSON event payload (event only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
    /// Milliseconds since the epoch. Debugging aid only.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn to_raw<T: Serialize + ?Sized>(value: &T) -> Result<Box<RawValue>> {
    serde_json::value::to_raw_value(value).map_err(|e| BridgeError::Encode(e.to_string()))
}

fn parse_raw<T: DeserializeOwned>(raw: Option<&RawValue>) -> Result<Option<T>> {
    match raw {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw.get())
            .map(Some)
            .map_err(|e| BridgeError::Decode(e.to_string())),
    }
}

impl Message {
    fn empty(id: String, msg_type: MessageType) -> Self {
        Self {
            id,
            msg_type,
            method: String::new(),
            args: None,
            result: None,
            error: None,
            event: String::new(),
            data: None,
            timestamp: now_millis(),
        }
    }

    /// Build a call message. `args` must serialize to a JSON array (tuples and
    /// `Vec`s do).
    pub fn call<A: Serialize + ?Sized>(
        id: impl Into<String>,
        method: impl Into<String>,
        args: &A,
    ) -> Result<Self> {
        let raw = to_raw(args)?;
        if !raw.get().trim_start().starts_with('[') {
            return Err(BridgeError::Encode("call arguments must encode as a JSON array".into()));
        }
        let mut msg = Self::empty(id.into(), MessageType::Call);
        msg.method = method.into();
        msg.args = Some(raw);
        Ok(msg)
    }

    /// Build a result message carrying `result`.
    pub fn result<T: Serialize + ?Sized>(id: impl Into<String>, result: &T) -> Result<Self> {
        let raw = to_raw(result)?;
        let mut msg = Self::empty(id.into(), MessageType::Result);
        msg.result = Some(raw);
        Ok(msg)
    }

    /// Build an error message. Never fails.
    pub fn error(
        id: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let mut msg = Self::empty(id.into(), MessageType::Error);
        msg.error = Some(ErrorPayload {
            code: code.as_i32(),
            message: message.into(),
            details: details.into(),
        });
        msg
    }

    /// Build a broadcast event message (no correlation id).
    pub fn event<T: Serialize + ?Sized>(event: impl Into<String>, data: &T) -> Result<Self> {
        let raw = to_raw(data)?;
        let mut msg = Self::empty(String::new(), MessageType::Event);
        msg.event = event.into();
        msg.data = Some(raw);
        Ok(msg)
    }

    /// Serialize to transport text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| BridgeError::Encode(e.to_string()))
    }

    /// Deserialize from transport text.
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| BridgeError::Decode(e.to_string()))
    }

    /// Decode `args` into `T`; `Ok(None)` when absent.
    pub fn parse_args<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        parse_raw(self.args.as_deref())
    }

    /// Decode `result` into `T`; `Ok(None)` when absent (or `null`).
    pub fn parse_result<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        parse_raw(self.result.as_deref())
    }

    /// Decode `data` into `T`; `Ok(None)` when absent.
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        parse_raw(self.data.as_deref())
    }

    /// Split `args` into ordered raw slots without decoding their contents.
    pub fn raw_args(&self) -> Result<Vec<Box<RawValue>>> {
        split_raw_args(self.args.as_deref())
    }
}

/// Split a raw JSON array into per-position raw values. Absent means zero slots.
pub fn split_raw_args(raw: Option<&RawValue>) -> Result<Vec<Box<RawValue>>> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => {
            let slots: Option<Vec<Box<RawValue>>> = serde_json::from_str(raw.get())
                .map_err(|e| BridgeError::Decode(format!("arguments must be a JSON array: {e}")))?;
            Ok(slots.unwrap_or_default())
        }
    }
}
