//! Reference guest runtime
//!
//! A value-exchange runtime with globals, member access, and function calls.
//! It implements `GuestContext` so bound host objects can be installed into
//! it and driven from tests or from an embedding host. There is no source
//! language: callers drive it through `call`, `call_member`, and
//! `call_global`.

mod convert;
mod exception;

pub use convert::{convert_to, export, to_guest};
pub use exception::{Exception, ExceptionKind};

use tether_sdk::{
    BridgeError, BridgeResult, GuestArray, GuestContext, GuestFunction, GuestObject, GuestValue,
    HostType, HostValue, NativeFn,
};

/// Guest runtime instance.
///
/// Single-threaded: all values are reference counted without atomics.
#[derive(Default)]
pub struct Runtime {
    globals: GuestObject,
}

impl Runtime {
    /// Create an empty runtime
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a global, `undefined` when absent
    pub fn global(&self, name: &str) -> GuestValue {
        self.globals.get(name)
    }

    /// Names of all globals, in definition order
    pub fn global_names(&self) -> Vec<String> {
        self.globals.keys()
    }

    /// Read a member.
    ///
    /// Missing members read as `undefined`. Reading from `null` or
    /// `undefined` is a `TypeError`.
    pub fn get_member(&self, target: &GuestValue, name: &str) -> Result<GuestValue, Exception> {
        match target {
            GuestValue::Object(obj) => Ok(obj.get(name)),
            GuestValue::Array(items) if name == "length" => Ok(GuestValue::Int(items.len() as i64)),
            GuestValue::Function(func) => Ok(match name {
                "name" => GuestValue::from(func.name()),
                "length" => GuestValue::Int(func.length() as i64),
                _ => GuestValue::Undefined,
            }),
            GuestValue::Null | GuestValue::Undefined => Err(Exception::type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                target.type_name(),
                name
            ))),
            _ => Ok(GuestValue::Undefined),
        }
    }

    /// Call a function value
    pub fn call(&self, callee: &GuestValue, args: &[GuestValue]) -> Result<GuestValue, Exception> {
        match callee {
            GuestValue::Function(func) => func.call(self, args).map_err(Exception::from),
            other => Err(Exception::type_error(format!(
                "{} is not a function",
                other.type_name()
            ))),
        }
    }

    /// Call `target.name(...args)`
    pub fn call_member(
        &self,
        target: &GuestValue,
        name: &str,
        args: &[GuestValue],
    ) -> Result<GuestValue, Exception> {
        let callee = self.get_member(target, name)?;
        if callee.as_function().is_none() {
            return Err(Exception::type_error(format!("{} is not a function", name)));
        }
        self.call(&callee, args)
    }

    /// Call a global function
    pub fn call_global(&self, name: &str, args: &[GuestValue]) -> Result<GuestValue, Exception> {
        let callee = self.global(name);
        if callee.as_function().is_none() {
            return Err(Exception::type_error(format!("{} is not a function", name)));
        }
        self.call(&callee, args)
    }
}

impl GuestContext for Runtime {
    fn export(&self, value: &GuestValue) -> Option<HostValue> {
        convert::export(value)
    }

    fn convert_to(&self, value: &GuestValue, target: &HostType) -> Option<HostValue> {
        convert::convert_to(value, target)
    }

    fn to_guest(&self, value: HostValue) -> GuestValue {
        convert::to_guest(value)
    }

    fn new_object(&self) -> GuestValue {
        GuestValue::Object(GuestObject::new())
    }

    fn new_array(&self, items: Vec<GuestValue>) -> GuestValue {
        GuestValue::Array(GuestArray::new(items))
    }

    fn new_function(&self, name: &str, length: usize, variadic: bool, call: NativeFn) -> GuestFunction {
        GuestFunction::new(name, length, variadic, call)
    }

    fn set_member(&self, target: &GuestValue, name: &str, value: GuestValue) -> BridgeResult<()> {
        match target {
            GuestValue::Object(obj) => {
                obj.set(name, value);
                Ok(())
            }
            other => Err(BridgeError::NotAnObject(other.type_name().to_string())),
        }
    }

    fn set_global(&self, name: &str, value: GuestValue) {
        self.globals.set(name, value);
    }
}
