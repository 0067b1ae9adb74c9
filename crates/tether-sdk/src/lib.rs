//! Tether SDK - host type model and guest boundary
//!
//! This crate provides the types and traits needed to make Rust types
//! callable from an embedded guest runtime, without depending on the bridge
//! engine itself.
//!
//! # Example
//!
//! ```ignore
//! use tether_macros::bindable;
//!
//! pub struct Calculator;
//!
//! #[bindable]
//! impl Calculator {
//!     pub fn sum(&self, a: i64, b: i64) -> i64 {
//!         a + b
//!     }
//!
//!     pub fn divide(&self, a: f64, b: f64) -> Result<f64, String> {
//!         if b == 0.0 {
//!             return Err("divide by zero".to_string());
//!         }
//!         Ok(a / b)
//!     }
//! }
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod convert;
pub mod error;
pub mod host;
pub mod method;
pub mod object;
pub mod value;

pub use context::GuestContext;
pub use convert::{FromHost, HostTyped, IntoHost};
pub use error::{ArityShape, BridgeError, BridgeResult, HostError};
pub use host::{HostType, HostValue, Number, StructType};
pub use method::{Bindable, Invoker, Method, MethodDescriptor};
pub use object::{BoundMethod, ErasedObject, HostCall, HostObject};
pub use value::{Callback, GuestArray, GuestFunction, GuestObject, GuestValue, NativeFn};
