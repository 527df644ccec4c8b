//! Shared error type across webshell crates.

use thiserror::Error;

/// Wire-level error codes (stable API, carried in `error.code`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed message, unexpected message type, or anything unclassified.
    Unknown,
    /// No function is bound under the requested name.
    MethodNotFound,
    /// Wrong argument count or an argument of the wrong shape.
    InvalidArgs,
    /// The bound function itself failed.
    Execution,
}

impl ErrorCode {
    /// Integer representation used in JSON messages.
    pub fn as_i32(self) -> i32 {
        match self {
            ErrorCode::Unknown => -1,
            ErrorCode::MethodNotFound => -2,
            ErrorCode::InvalidArgs => -3,
            ErrorCode::Execution => -4,
        }
    }

    /// Reverse of [`ErrorCode::as_i32`]. Codes outside the standard set map to `Unknown`.
    pub fn from_i32(code: i32) -> Self {
        match code {
            -2 => ErrorCode::MethodNotFound,
            -3 => ErrorCode::InvalidArgs,
            -4 => ErrorCode::Execution,
            _ => ErrorCode::Unknown,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type used by core and bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),
    #[error("binding '{0}' failed: not found")]
    NotFound(String),
    #[error("binding '{name}' failed: {reason}")]
    InvalidArgument { name: String, reason: String },
    #[error("binding '{name}' failed: expected {expected} arguments, got {got}")]
    ArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("binding '{name}' failed: failed to convert argument {index} to {type_name}: {reason}")]
    ArgumentType {
        name: String,
        index: usize,
        type_name: &'static str,
        reason: String,
    },
    #[error("binding '{0}' failed: already registered")]
    DuplicateBinding(String),
    #[error("binding '{name}' failed: {reason}")]
    InvalidBinding { name: String, reason: String },
    /// The bound function returned an error; the message is its own text.
    #[error("{message}")]
    Execution { name: String, message: String },
    #[error("binding '{name}' panicked: {message}")]
    Panicked { name: String, message: String },
    #[error("script evaluation failed: {0}")]
    Eval(String),
    /// The web side answered a native-issued call with an error message.
    #[error("remote error ({code}): {message}")]
    Remote { code: i32, message: String },
    #[error("call '{0}' timed out")]
    Timeout(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map an error to the wire code a caller should see.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            BridgeError::NotFound(_) => ErrorCode::MethodNotFound,
            BridgeError::InvalidArgument { .. }
            | BridgeError::ArgumentCount { .. }
            | BridgeError::ArgumentType { .. } => ErrorCode::InvalidArgs,
            BridgeError::Decode(_) | BridgeError::UnknownMessageType(_) => ErrorCode::Unknown,
            BridgeError::Remote { code, .. } => ErrorCode::from_i32(*code),
            _ => ErrorCode::Execution,
        }
    }
}
