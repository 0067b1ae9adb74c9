//! Host type model
//!
//! `HostType` is the semantic type of a method parameter or return value as
//! seen by the bridge. `HostValue` is a dynamically typed host value that
//! always knows its own `HostType`; the coercer produces one of these for
//! every argument before the generated invoker turns it into a Rust value.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::HostError;
use crate::object::HostObject;
use crate::value::GuestFunction;

// ============================================================================
// HostType
// ============================================================================

/// Semantic type of a host parameter or return value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostType {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64` (also `isize`)
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64` (also `usize`)
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `String`
    String,
    /// `Option<T>`; nil is `None`
    Pointer(Box<HostType>),
    /// `Vec<T>`
    Slice(Box<HostType>),
    /// String-keyed map with values of the inner type
    Map(Box<HostType>),
    /// Any host value; nil is `HostValue::Nil`
    Any,
    /// Guest callback; nil is "no function"
    Func,
    /// Plain aggregate with named fields
    Struct(Rc<StructType>),
    /// Distinct named type over an underlying representation
    Named {
        /// Declared name
        name: &'static str,
        /// Representation shared with the underlying type
        underlying: Box<HostType>,
    },
    /// A bindable host type, passed around as a shared handle
    Object(&'static str),
    /// Trailing error return
    Error,
}

/// Field layout of a plain aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    /// Declared struct name
    pub name: &'static str,
    /// Fields in declaration order
    pub fields: Vec<(&'static str, HostType)>,
}

impl StructType {
    /// Create a struct layout
    pub fn new(name: &'static str, fields: Vec<(&'static str, HostType)>) -> Self {
        Self { name, fields }
    }

    /// Index of a field by name
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(field, _)| *field == name)
    }
}

impl HostType {
    /// Signed integer types
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            HostType::I8 | HostType::I16 | HostType::I32 | HostType::I64
        )
    }

    /// Unsigned integer types
    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            HostType::U8 | HostType::U16 | HostType::U32 | HostType::U64
        )
    }

    /// Any integer type
    pub fn is_integer(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    /// Floating-point types
    pub fn is_float(&self) -> bool {
        matches!(self, HostType::F32 | HostType::F64)
    }

    /// Integer or floating-point types
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Types whose zero value is "nothing": pointers, interfaces,
    /// collections, and functions.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            HostType::Pointer(_)
                | HostType::Any
                | HostType::Slice(_)
                | HostType::Map(_)
                | HostType::Func
        )
    }

    /// The representation type, with any `Named` layers removed
    pub fn underlying(&self) -> &HostType {
        match self {
            HostType::Named { underlying, .. } => underlying.underlying(),
            other => other,
        }
    }

    /// Zero value of this type.
    ///
    /// Returns `None` for bindable objects and errors, which have no zero value.
    pub fn zero_value(&self) -> Option<HostValue> {
        Some(match self {
            HostType::Bool => HostValue::Bool(false),
            HostType::I8 => HostValue::I8(0),
            HostType::I16 => HostValue::I16(0),
            HostType::I32 => HostValue::I32(0),
            HostType::I64 => HostValue::I64(0),
            HostType::U8 => HostValue::U8(0),
            HostType::U16 => HostValue::U16(0),
            HostType::U32 => HostValue::U32(0),
            HostType::U64 => HostValue::U64(0),
            HostType::F32 => HostValue::F32(0.0),
            HostType::F64 => HostValue::F64(0.0),
            HostType::String => HostValue::String(String::new()),
            HostType::Pointer(elem) => HostValue::Pointer {
                elem: (**elem).clone(),
                value: None,
            },
            HostType::Slice(elem) => HostValue::Slice {
                elem: (**elem).clone(),
                items: Vec::new(),
            },
            HostType::Map(value) => HostValue::Map {
                value: (**value).clone(),
                entries: BTreeMap::new(),
            },
            HostType::Any => HostValue::Nil,
            HostType::Func => HostValue::Func(None),
            HostType::Struct(ty) => HostValue::Struct {
                ty: ty.clone(),
                fields: ty
                    .fields
                    .iter()
                    .map(|(_, field)| field.zero_value())
                    .collect::<Option<Vec<_>>>()?,
            },
            HostType::Named { name, underlying } => HostValue::Named {
                name: *name,
                value: Box::new(underlying.zero_value()?),
            },
            HostType::Object(_) | HostType::Error => return None,
        })
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Bool => f.write_str("bool"),
            HostType::I8 => f.write_str("i8"),
            HostType::I16 => f.write_str("i16"),
            HostType::I32 => f.write_str("i32"),
            HostType::I64 => f.write_str("i64"),
            HostType::U8 => f.write_str("u8"),
            HostType::U16 => f.write_str("u16"),
            HostType::U32 => f.write_str("u32"),
            HostType::U64 => f.write_str("u64"),
            HostType::F32 => f.write_str("f32"),
            HostType::F64 => f.write_str("f64"),
            HostType::String => f.write_str("String"),
            HostType::Pointer(elem) => write!(f, "Option<{}>", elem),
            HostType::Slice(elem) => write!(f, "Vec<{}>", elem),
            HostType::Map(value) => write!(f, "Map<String, {}>", value),
            HostType::Any => f.write_str("any"),
            HostType::Func => f.write_str("function"),
            HostType::Struct(ty) => f.write_str(ty.name),
            HostType::Named { name, .. } => f.write_str(name),
            HostType::Object(name) => f.write_str(name),
            HostType::Error => f.write_str("error"),
        }
    }
}

// ============================================================================
// Numbers
// ============================================================================

/// Numeric payload of a host value, widened for conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Any integer, signed or unsigned
    Int(i128),
    /// Any float
    Float(f64),
}

impl Number {
    /// Convert to the numeric host type `target`.
    ///
    /// Returns `None` when `target` is not numeric. Floats are truncated toward
    /// zero for integer targets; values outside the target range fail.
    pub fn cast(self, target: &HostType) -> Option<Result<HostValue, String>> {
        if target.is_float() {
            let f = match self {
                Number::Int(i) => i as f64,
                Number::Float(f) => f,
            };
            return Some(Ok(match target {
                HostType::F32 => HostValue::F32(f as f32),
                _ => HostValue::F64(f),
            }));
        }
        if !target.is_integer() {
            return None;
        }

        let int = match self {
            Number::Int(i) => i,
            Number::Float(f) => {
                if !f.is_finite() {
                    return Some(Err(format!("{} is not a finite number", f)));
                }
                let truncated = f.trunc();
                if truncated < i128::MIN as f64 || truncated > i128::MAX as f64 {
                    return Some(Err(out_of_range(f, target)));
                }
                truncated as i128
            }
        };

        let value = match target {
            HostType::I8 => i8::try_from(int).map(HostValue::I8).ok(),
            HostType::I16 => i16::try_from(int).map(HostValue::I16).ok(),
            HostType::I32 => i32::try_from(int).map(HostValue::I32).ok(),
            HostType::I64 => i64::try_from(int).map(HostValue::I64).ok(),
            HostType::U8 => u8::try_from(int).map(HostValue::U8).ok(),
            HostType::U16 => u16::try_from(int).map(HostValue::U16).ok(),
            HostType::U32 => u32::try_from(int).map(HostValue::U32).ok(),
            HostType::U64 => u64::try_from(int).map(HostValue::U64).ok(),
            _ => None,
        };
        Some(value.ok_or_else(|| out_of_range(int, target)))
    }
}

fn out_of_range(value: impl fmt::Display, target: &HostType) -> String {
    format!("{} is out of range for {}", value, target)
}

// ============================================================================
// HostValue
// ============================================================================

/// Dynamically typed host value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HostValue {
    /// Nil interface value
    #[default]
    Nil,
    /// `bool`
    Bool(bool),
    /// `i8`
    I8(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `u8`
    U8(u8),
    /// `u16`
    U16(u16),
    /// `u32`
    U32(u32),
    /// `u64`
    U64(u64),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
    /// `String`
    String(String),
    /// Optional value; `None` is nil
    Pointer {
        /// Pointee type
        elem: HostType,
        /// Pointee, if any
        value: Option<Box<HostValue>>,
    },
    /// Ordered collection
    Slice {
        /// Element type
        elem: HostType,
        /// Elements
        items: Vec<HostValue>,
    },
    /// String-keyed map
    Map {
        /// Value type
        value: HostType,
        /// Entries, ordered by key
        entries: BTreeMap<String, HostValue>,
    },
    /// Guest callback, or nil
    Func(Option<GuestFunction>),
    /// Plain aggregate; `fields` follow `ty.fields`
    Struct {
        /// Layout
        ty: Rc<StructType>,
        /// Field values in declaration order
        fields: Vec<HostValue>,
    },
    /// Value of a named type
    Named {
        /// Declared name
        name: &'static str,
        /// Underlying value
        value: Box<HostValue>,
    },
    /// Bindable host object
    Object(HostObject),
    /// Trailing error slot; `None` means the call succeeded
    Error(Option<HostError>),
}

impl HostValue {
    /// Build a slice value
    pub fn slice(elem: HostType, items: Vec<HostValue>) -> Self {
        HostValue::Slice { elem, items }
    }

    /// Build a pointer value
    pub fn pointer(elem: HostType, value: Option<HostValue>) -> Self {
        HostValue::Pointer {
            elem,
            value: value.map(Box::new),
        }
    }

    /// Build a named value
    pub fn named(name: &'static str, value: HostValue) -> Self {
        HostValue::Named {
            name,
            value: Box::new(value),
        }
    }

    /// Build a struct value from its type and field values.
    ///
    /// Yields `Nil` when `ty` is not a struct type.
    pub fn new_struct(ty: HostType, fields: Vec<HostValue>) -> Self {
        match ty {
            HostType::Struct(ty) => HostValue::Struct { ty, fields },
            _ => HostValue::Nil,
        }
    }

    /// The semantic type of this value
    pub fn host_type(&self) -> HostType {
        match self {
            HostValue::Nil => HostType::Any,
            HostValue::Bool(_) => HostType::Bool,
            HostValue::I8(_) => HostType::I8,
            HostValue::I16(_) => HostType::I16,
            HostValue::I32(_) => HostType::I32,
            HostValue::I64(_) => HostType::I64,
            HostValue::U8(_) => HostType::U8,
            HostValue::U16(_) => HostType::U16,
            HostValue::U32(_) => HostType::U32,
            HostValue::U64(_) => HostType::U64,
            HostValue::F32(_) => HostType::F32,
            HostValue::F64(_) => HostType::F64,
            HostValue::String(_) => HostType::String,
            HostValue::Pointer { elem, .. } => HostType::Pointer(Box::new(elem.clone())),
            HostValue::Slice { elem, .. } => HostType::Slice(Box::new(elem.clone())),
            HostValue::Map { value, .. } => HostType::Map(Box::new(value.clone())),
            HostValue::Func(_) => HostType::Func,
            HostValue::Struct { ty, .. } => HostType::Struct(ty.clone()),
            HostValue::Named { name, value } => HostType::Named {
                name: *name,
                underlying: Box::new(value.host_type()),
            },
            HostValue::Object(object) => HostType::Object(object.type_name()),
            HostValue::Error(_) => HostType::Error,
        }
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> String {
        match self {
            HostValue::Nil => "nil".to_string(),
            other => other.host_type().to_string(),
        }
    }

    /// True for the nil interface and for empty pointers, callbacks, and error slots
    pub fn is_nil(&self) -> bool {
        matches!(
            self,
            HostValue::Nil
                | HostValue::Pointer { value: None, .. }
                | HostValue::Func(None)
                | HostValue::Error(None)
        )
    }

    /// Numeric payload, if this is a number
    pub fn as_number(&self) -> Option<Number> {
        Some(match *self {
            HostValue::I8(v) => Number::Int(v as i128),
            HostValue::I16(v) => Number::Int(v as i128),
            HostValue::I32(v) => Number::Int(v as i128),
            HostValue::I64(v) => Number::Int(v as i128),
            HostValue::U8(v) => Number::Int(v as i128),
            HostValue::U16(v) => Number::Int(v as i128),
            HostValue::U32(v) => Number::Int(v as i128),
            HostValue::U64(v) => Number::Int(v as i128),
            HostValue::F32(v) => Number::Float(v as f64),
            HostValue::F64(v) => Number::Float(v),
            _ => return None,
        })
    }

    /// Integer payload as i64, if it fits
    pub fn as_i64(&self) -> Option<i64> {
        match self.as_number()? {
            Number::Int(i) => i64::try_from(i).ok(),
            Number::Float(_) => None,
        }
    }

    /// Numeric payload as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self.as_number()? {
            Number::Int(i) => Some(i as f64),
            Number::Float(f) => Some(f),
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Bindable object payload
    pub fn as_object(&self) -> Option<&HostObject> {
        match self {
            HostValue::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        HostValue::I64(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::F64(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::String(value)
    }
}
