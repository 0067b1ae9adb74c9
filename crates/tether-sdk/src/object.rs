//! Type-erased bindable host objects
//!
//! `HostObject` lets the bridge introspect and call a host instance without
//! knowing its concrete type. It is what a bound object's method table closes
//! over, and what travels inside `HostValue::Object` when a method returns
//! another bindable object.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::BridgeResult;
use crate::host::HostValue;
use crate::method::{Bindable, MethodDescriptor};

/// Call into one method of one specific instance.
pub type HostCall = Rc<dyn Fn(Vec<HostValue>) -> BridgeResult<Vec<HostValue>>>;

/// A method of a concrete instance: its descriptor plus a call closing over
/// the instance.
#[derive(Clone)]
pub struct BoundMethod {
    /// Signature
    pub descriptor: MethodDescriptor,
    /// Invocation against the captured instance
    pub call: HostCall,
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// Object-safe view of a `Bindable` instance.
pub trait ErasedObject: Any {
    /// Registered host type name
    fn type_name(&self) -> &'static str;

    /// Descriptors of every exported method, without capturing the instance
    fn descriptors(&self) -> Vec<MethodDescriptor>;

    /// Method table closing over this instance
    fn bound_methods(self: Rc<Self>) -> Vec<BoundMethod>;

    /// Upcast for downcasting back to the concrete type
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Bindable> ErasedObject for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn descriptors(&self) -> Vec<MethodDescriptor> {
        T::methods().into_iter().map(|m| m.descriptor).collect()
    }

    fn bound_methods(self: Rc<Self>) -> Vec<BoundMethod> {
        T::methods()
            .into_iter()
            .map(|method| {
                let this = Rc::clone(&self);
                let invoke = method.invoke;
                BoundMethod {
                    descriptor: method.descriptor,
                    call: Rc::new(move |args| invoke(&this, args)),
                }
            })
            .collect()
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Shared handle to a bindable host instance.
#[derive(Clone)]
pub struct HostObject {
    inner: Rc<dyn ErasedObject>,
}

impl HostObject {
    /// Wrap a shared instance
    pub fn new<T: Bindable>(instance: Rc<T>) -> Self {
        Self { inner: instance }
    }

    /// Registered host type name
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    /// Descriptors of every exported method
    pub fn descriptors(&self) -> Vec<MethodDescriptor> {
        self.inner.descriptors()
    }

    /// Method table closing over this instance
    pub fn bound_methods(&self) -> Vec<BoundMethod> {
        Rc::clone(&self.inner).bound_methods()
    }

    /// Recover the concrete instance
    pub fn downcast<T: Bindable>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.inner).into_any().downcast::<T>().ok()
    }

    /// Whether both handles refer to the same instance
    pub fn ptr_eq(&self, other: &HostObject) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.inner) as *const (),
            Rc::as_ptr(&other.inner) as *const (),
        )
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostObject({})", self.type_name())
    }
}
