//! Method registry
//!
//! A bindable type publishes its exported methods through `Bindable::methods`.
//! Each entry pairs a `MethodDescriptor` with an invoker that takes already
//! coerced arguments. `#[bindable]` from `tether-macros` generates the whole
//! table; implementing it by hand is supported too.
//!
//! # Example
//!
//! ```ignore
//! use tether_sdk::{Bindable, BridgeResult, FromHost, HostType, HostValue, IntoHost, Method, MethodDescriptor};
//!
//! struct Counter;
//!
//! impl Bindable for Counter {
//!     const TYPE_NAME: &'static str = "Counter";
//!
//!     fn methods() -> Vec<Method<Self>> {
//!         vec![Method::new(
//!             MethodDescriptor::new("double").param(HostType::I64).returns(HostType::I64),
//!             |_this: &Self, args: Vec<HostValue>| -> BridgeResult<Vec<HostValue>> {
//!                 let mut args = args.into_iter();
//!                 let n = i64::from_host(args.next().unwrap_or_default())?;
//!                 Ok(vec![(n * 2).into_host()])
//!             },
//!         )]
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;

use crate::error::{ArityShape, BridgeResult};
use crate::host::{HostType, HostValue};

/// Signature of one exported host method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    /// Declared method name
    pub name: String,
    /// Fixed parameter types, in order
    pub params: Vec<HostType>,
    /// Element type of the trailing variadic parameter, if any
    pub variadic: Option<HostType>,
    /// Return types, including the trailing `Error` for fallible methods
    pub returns: Vec<HostType>,
    /// Whether the final return is an error slot
    pub last_return_is_error: bool,
}

impl MethodDescriptor {
    /// Start a descriptor with no parameters and no returns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            variadic: None,
            returns: Vec::new(),
            last_return_is_error: false,
        }
    }

    /// Append a fixed parameter
    pub fn param(mut self, ty: HostType) -> Self {
        self.params.push(ty);
        self
    }

    /// Declare the variadic tail.
    ///
    /// Accepts either the element type or the `Vec<E>` parameter type; a slice
    /// type is unwrapped to its element.
    pub fn variadic(mut self, ty: HostType) -> Self {
        let elem = match ty {
            HostType::Slice(elem) => *elem,
            other => other,
        };
        self.variadic = Some(elem);
        self
    }

    /// Append a return type
    pub fn returns(mut self, ty: HostType) -> Self {
        self.returns.push(ty);
        self
    }

    /// Mark the method as fallible: a trailing error return is appended
    pub fn fallible(mut self) -> Self {
        self.returns.push(HostType::Error);
        self.last_return_is_error = true;
        self
    }

    /// Whether the method takes a variadic tail
    pub fn has_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    /// Number of fixed parameters
    pub fn fixed_arity(&self) -> usize {
        self.params.len()
    }

    /// Exact or minimum arity
    pub fn arity_shape(&self) -> ArityShape {
        if self.has_variadic() {
            ArityShape::Variadic
        } else {
            ArityShape::Exact
        }
    }

    /// Whether `count` guest arguments satisfy the signature
    pub fn accepts(&self, count: usize) -> bool {
        if self.has_variadic() {
            count >= self.params.len()
        } else {
            count == self.params.len()
        }
    }

    /// Return types visible to the caller (the error slot removed)
    pub fn visible_returns(&self) -> &[HostType] {
        if self.last_return_is_error {
            &self.returns[..self.returns.len() - 1]
        } else {
            &self.returns
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        if let Some(elem) = &self.variadic {
            if !self.params.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...{}", elem)?;
        }
        write!(f, ")")?;
        match self.returns.len() {
            0 => Ok(()),
            1 => write!(f, " -> {}", self.returns[0]),
            _ => {
                write!(f, " -> (")?;
                for (i, ret) in self.returns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ret)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Invoker for one method: receives the target and the coerced arguments
/// (fixed ones first, then the variadic tail as one `Slice`), returns every
/// declared return value including the trailing error slot.
pub type Invoker<T> = fn(&T, Vec<HostValue>) -> BridgeResult<Vec<HostValue>>;

/// Registry entry: descriptor plus invoker.
pub struct Method<T> {
    /// Signature
    pub descriptor: MethodDescriptor,
    /// Call into the method
    pub invoke: Invoker<T>,
}

impl<T> Method<T> {
    /// Create a registry entry
    pub fn new(descriptor: MethodDescriptor, invoke: Invoker<T>) -> Self {
        Self { descriptor, invoke }
    }
}

impl<T> Clone for Method<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            invoke: self.invoke,
        }
    }
}

impl<T> fmt::Debug for Method<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// A host type whose exported methods can be bound into a guest runtime.
pub trait Bindable: Any {
    /// Host type name used for introspection and rebinding decisions
    const TYPE_NAME: &'static str;

    /// Every exported method, in declaration order
    fn methods() -> Vec<Method<Self>>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder() {
        let desc = MethodDescriptor::new("sum")
            .param(HostType::I64)
            .param(HostType::I64)
            .returns(HostType::I64)
            .fallible();

        assert_eq!(desc.fixed_arity(), 2);
        assert!(!desc.has_variadic());
        assert!(desc.last_return_is_error);
        assert_eq!(desc.returns, vec![HostType::I64, HostType::Error]);
        assert_eq!(desc.visible_returns(), &[HostType::I64]);
        assert_eq!(desc.to_string(), "sum(i64, i64) -> (i64, error)");
    }

    #[test]
    fn test_variadic_unwraps_slice_type() {
        let desc = MethodDescriptor::new("vsum")
            .param(HostType::String)
            .variadic(HostType::Slice(Box::new(HostType::I64)))
            .returns(HostType::I64);

        assert_eq!(desc.variadic, Some(HostType::I64));
        assert_eq!(desc.arity_shape(), ArityShape::Variadic);
        assert!(!desc.accepts(0));
        assert!(desc.accepts(1));
        assert!(desc.accepts(5));
        assert_eq!(desc.to_string(), "vsum(String, ...i64) -> i64");
    }

    #[test]
    fn test_exact_arity() {
        let desc = MethodDescriptor::new("echo")
            .param(HostType::String)
            .returns(HostType::String);
        assert!(desc.accepts(1));
        assert!(!desc.accepts(0));
        assert!(!desc.accepts(2));
    }
}
