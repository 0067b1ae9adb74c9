//! Error types for the binding boundary
//!
//! Every failure a bound call can produce is a `BridgeError`. Guest runtimes
//! turn these into guest exceptions at the outermost call edge; host-side
//! helpers return them directly.

use std::fmt;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Whether an arity requirement is exact or a minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityShape {
    /// Exactly the fixed parameter count
    Exact,
    /// At least the fixed parameter count, followed by variadic elements
    Variadic,
}

impl fmt::Display for ArityShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArityShape::Exact => Ok(()),
            ArityShape::Variadic => f.write_str("+variadic"),
        }
    }
}

/// Error returned by a host method, carried verbatim to the guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    message: String,
}

impl HostError {
    /// Create a host error with the given description
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Capture the description of any displayable error value
    pub fn from_display<E: fmt::Display + ?Sized>(err: &E) -> Self {
        Self::new(err.to_string())
    }

    /// The original error description
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HostError {}

/// Bridge error taxonomy
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    /// Wrong number of guest arguments for the method signature
    #[error("method {method} requires {required} arguments{shape}, got {got}")]
    Arity {
        /// Guest-visible method name
        method: String,
        /// Number of fixed parameters
        required: usize,
        /// Exact or minimum
        shape: ArityShape,
        /// Number of arguments supplied
        got: usize,
    },

    /// An argument matched a coercion rule but could not be converted
    #[error("convert argument {index} for {method} failed: {reason}")]
    Coercion {
        /// Guest-visible method name
        method: String,
        /// Zero-based argument position
        index: usize,
        /// Required host type
        target: String,
        /// Why the conversion failed
        reason: String,
    },

    /// Proxy binding invoked before a backing instance was installed
    #[error("{type_name} target not set for proxy")]
    TargetUnset {
        /// Host type the proxy was bound against
        type_name: String,
    },

    /// The host method returned a non-nil trailing error
    #[error("{0}")]
    HostMethod(HostError),

    /// No coercion rule applies to this value/type pair
    #[error("convert argument {index} for {method} failed: cannot use {got} as {target}")]
    UnsupportedConversion {
        /// Guest-visible method name
        method: String,
        /// Zero-based argument position
        index: usize,
        /// Required host type
        target: String,
        /// Type of the supplied value
        got: String,
    },

    /// The host method panicked
    #[error("method {method} panicked: {message}")]
    Panic {
        /// Guest-visible method name
        method: String,
        /// Panic payload, when it was a string
        message: String,
    },

    /// No exported method with this name
    #[error("method {0} not found")]
    MethodNotFound(String),

    /// Host-side call against a nil target
    #[error("target is nil")]
    NilTarget,

    /// Member operation on a value that is not an object
    #[error("{0} is not an object")]
    NotAnObject(String),

    /// A host value did not have the shape a conversion expected
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },
}

impl BridgeError {
    /// Shorthand for a `TypeMismatch`
    pub fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        BridgeError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// True when the error originated in the host method itself
    pub fn is_host_error(&self) -> bool {
        matches!(self, BridgeError::HostMethod(_) | BridgeError::Panic { .. })
    }
}

impl From<HostError> for BridgeError {
    fn from(err: HostError) -> Self {
        BridgeError::HostMethod(err)
    }
}
