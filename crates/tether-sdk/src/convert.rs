//! Traits for moving Rust values in and out of `HostValue`.
//!
//! Generated invokers call `FromHost` on each coerced argument and `IntoHost`
//! on each return. `HostTyped` supplies the `HostType` recorded in method
//! descriptors. Implement all three by hand for custom types, or use
//! `#[derive(HostStruct)]` from `tether-macros`.
//!
//! # Example
//!
//! ```ignore
//! use tether_sdk::{FromHost, HostTyped, HostType, HostValue, IntoHost, BridgeResult};
//!
//! struct Celsius(f64);
//!
//! impl HostTyped for Celsius {
//!     fn host_type() -> HostType {
//!         HostType::Named { name: "Celsius", underlying: Box::new(HostType::F64) }
//!     }
//! }
//!
//! impl FromHost for Celsius {
//!     fn from_host(value: HostValue) -> BridgeResult<Self> {
//!         let inner = tether_sdk::convert::named_inner(value, "Celsius")?;
//!         Ok(Celsius(f64::from_host(inner)?))
//!     }
//! }
//!
//! impl IntoHost for Celsius {
//!     fn into_host(self) -> HostValue {
//!         HostValue::named("Celsius", self.0.into_host())
//!     }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::rc::Rc;

use crate::error::{BridgeError, BridgeResult};
use crate::host::{HostType, HostValue};
use crate::method::Bindable;
use crate::object::HostObject;
use crate::value::Callback;

/// Rust types with a fixed host type.
pub trait HostTyped {
    /// The host type recorded in method descriptors
    fn host_type() -> HostType;
}

/// Extract a Rust value from an already coerced `HostValue`.
pub trait FromHost: Sized {
    /// Convert, failing with `TypeMismatch` when the shape is wrong
    fn from_host(value: HostValue) -> BridgeResult<Self>;
}

/// Convert a Rust value into a `HostValue`.
pub trait IntoHost {
    /// Convert
    fn into_host(self) -> HostValue;
}

fn mismatch<T>(expected: &HostType, value: &HostValue) -> BridgeResult<T> {
    Err(BridgeError::mismatch(expected.to_string(), value.type_name()))
}

// ============================================================================
// Primitive Type Implementations
// ============================================================================

macro_rules! impl_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl HostTyped for $ty {
                fn host_type() -> HostType {
                    HostType::$variant
                }
            }

            impl FromHost for $ty {
                fn from_host(value: HostValue) -> BridgeResult<Self> {
                    match value {
                        HostValue::$variant(v) => Ok(v),
                        other => mismatch(&HostType::$variant, &other),
                    }
                }
            }

            impl IntoHost for $ty {
                fn into_host(self) -> HostValue {
                    HostValue::$variant(self)
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl HostTyped for usize {
    fn host_type() -> HostType {
        HostType::U64
    }
}

impl FromHost for usize {
    fn from_host(value: HostValue) -> BridgeResult<Self> {
        let wide = u64::from_host(value)?;
        usize::try_from(wide).map_err(|_| BridgeError::mismatch("usize", wide.to_string()))
    }
}

impl IntoHost for usize {
    fn into_host(self) -> HostValue {
        HostValue::U64(self as u64)
    }
}

impl HostTyped for isize {
    fn host_type() -> HostType {
        HostType::I64
    }
}

impl FromHost for isize {
    fn from_host(value: HostValue) -> BridgeResult<Self> {
        let wide = i64::from_host(value)?;
        isize::try_from(wide).map_err(|_| BridgeError::mismatch("isize", wide.to_string()))
    }
}

impl IntoHost for isize {
    fn into_host(self) -> HostValue {
        HostValue::I64(self as i64)
    }
}

impl IntoHost for &str {
    fn into_host(self) -> HostValue {
        HostValue::String(self.to_string())
    }
}

// ============================================================================
// Dynamic values and callbacks
// ============================================================================

impl HostTyped for HostValue {
    fn host_type() -> HostType {
        HostType::Any
    }
}

impl FromHost for HostValue {
    fn from_host(value: HostValue) -> BridgeResult<Self> {
        Ok(value)
    }
}

impl IntoHost for HostValue {
    fn into_host(self) -> HostValue {
        self
    }
}

impl HostTyped for Callback {
    fn host_type() -> HostType {
        HostType::Func
    }
}

impl FromHost for Callback {
    fn from_host(value: HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Func(func) => Ok(Callback(func)),
            HostValue::Nil => Ok(Callback(None)),
            other => mismatch(&HostType::Func, &other),
        }
    }
}

impl IntoHost for Callback {
    fn into_host(self) -> HostValue {
        HostValue::Func(self.0)
    }
}

// ============================================================================
// Containers
// ============================================================================

impl<T: HostTyped> HostTyped for Option<T> {
    fn host_type() -> HostType {
        HostType::Pointer(Box::new(T::host_type()))
    }
}

impl<T: FromHost> FromHost for Option<T> {
    fn from_host(value: HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Pointer { value: None, .. } | HostValue::Nil => Ok(None),
            HostValue::Pointer {
                value: Some(inner), ..
            } => T::from_host(*inner).map(Some),
            other => Err(BridgeError::mismatch("Option", other.type_name())),
        }
    }
}

impl<T: HostTyped + IntoHost> IntoHost for Option<T> {
    fn into_host(self) -> HostValue {
        HostValue::pointer(T::host_type(), self.map(IntoHost::into_host))
    }
}

impl<T: HostTyped> HostTyped for Vec<T> {
    fn host_type() -> HostType {
        HostType::Slice(Box::new(T::host_type()))
    }
}

impl<T: FromHost> FromHost for Vec<T> {
    fn from_host(value: HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Slice { items, .. } => items.into_iter().map(T::from_host).collect(),
            other => Err(BridgeError::mismatch("Vec", other.type_name())),
        }
    }
}

impl<T: HostTyped + IntoHost> IntoHost for Vec<T> {
    fn into_host(self) -> HostValue {
        HostValue::slice(
            T::host_type(),
            self.into_iter().map(IntoHost::into_host).collect(),
        )
    }
}

impl<T: HostTyped, S> HostTyped for HashMap<String, T, S> {
    fn host_type() -> HostType {
        HostType::Map(Box::new(T::host_type()))
    }
}

impl<T: FromHost, S: BuildHasher + Default> FromHost for HashMap<String, T, S> {
    fn from_host(value: HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Map { entries, .. } => entries
                .into_iter()
                .map(|(k, v)| Ok((k, T::from_host(v)?)))
                .collect(),
            other => Err(BridgeError::mismatch("Map", other.type_name())),
        }
    }
}

impl<T: HostTyped + IntoHost, S> IntoHost for HashMap<String, T, S> {
    fn into_host(self) -> HostValue {
        HostValue::Map {
            value: T::host_type(),
            entries: self.into_iter().map(|(k, v)| (k, v.into_host())).collect(),
        }
    }
}

impl<T: HostTyped> HostTyped for BTreeMap<String, T> {
    fn host_type() -> HostType {
        HostType::Map(Box::new(T::host_type()))
    }
}

impl<T: FromHost> FromHost for BTreeMap<String, T> {
    fn from_host(value: HostValue) -> BridgeResult<Self> {
        match value {
            HostValue::Map { entries, .. } => entries
                .into_iter()
                .map(|(k, v)| Ok((k, T::from_host(v)?)))
                .collect(),
            other => Err(BridgeError::mismatch("Map", other.type_name())),
        }
    }
}

impl<T: HostTyped + IntoHost> IntoHost for BTreeMap<String, T> {
    fn into_host(self) -> HostValue {
        HostValue::Map {
            value: T::host_type(),
            entries: self.into_iter().map(|(k, v)| (k, v.into_host())).collect(),
        }
    }
}

// ============================================================================
// Bindable objects
// ============================================================================

impl<T: Bindable> HostTyped for Rc<T> {
    fn host_type() -> HostType {
        HostType::Object(T::TYPE_NAME)
    }
}

impl<T: Bindable> FromHost for Rc<T> {
    fn from_host(value: HostValue) -> BridgeResult<Self> {
        let got = value.type_name();
        value
            .as_object()
            .and_then(HostObject::downcast::<T>)
            .ok_or_else(|| BridgeError::mismatch(T::TYPE_NAME, got))
    }
}

impl<T: Bindable> IntoHost for Rc<T> {
    fn into_host(self) -> HostValue {
        HostValue::Object(HostObject::new(self))
    }
}

// ============================================================================
// Derive support
// ============================================================================

/// Field values of a struct value named `name`, in declaration order.
pub fn struct_fields(value: HostValue, name: &'static str) -> BridgeResult<Vec<HostValue>> {
    match value {
        HostValue::Struct { ty, fields } if ty.name == name => Ok(fields),
        other => Err(BridgeError::mismatch(name, other.type_name())),
    }
}

/// Underlying value of a named value called `name`.
pub fn named_inner(value: HostValue, name: &'static str) -> BridgeResult<HostValue> {
    match value {
        HostValue::Named { name: actual, value } if actual == name => Ok(*value),
        other => Err(BridgeError::mismatch(name, other.type_name())),
    }
}
