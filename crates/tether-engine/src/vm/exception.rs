//! Guest exceptions raised at the runtime's call edge

use std::fmt;

use tether_sdk::BridgeError;

/// Guest exception class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    /// Misuse of a binding: arity, conversion, unset proxy target
    TypeError,
    /// Failure reported by the host itself
    Error,
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExceptionKind::TypeError => f.write_str("TypeError"),
            ExceptionKind::Error => f.write_str("Error"),
        }
    }
}

/// An exception thrown into guest code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Exception {
    /// Exception class
    pub kind: ExceptionKind,
    /// Exception message
    pub message: String,
}

impl Exception {
    /// Create a `TypeError`
    pub fn type_error(message: impl Into<String>) -> Self {
        Self {
            kind: ExceptionKind::TypeError,
            message: message.into(),
        }
    }

    /// Create a plain `Error`
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ExceptionKind::Error,
            message: message.into(),
        }
    }
}

impl From<BridgeError> for Exception {
    fn from(err: BridgeError) -> Self {
        let message = err.to_string();
        if err.is_host_error() {
            Exception::error(message)
        } else {
            Exception::type_error(message)
        }
    }
}
