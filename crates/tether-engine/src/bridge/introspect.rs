//! Method-set introspection
//!
//! Exported methods come from each type's `Bindable` registry. Results are
//! ordered by declared name so every bind sees the same order.

use tether_sdk::{Bindable, BoundMethod, HostObject, HostValue, MethodDescriptor};

/// Descriptors of a host value's exported methods.
///
/// Nil and non-object values have none.
pub fn introspect(value: &HostValue) -> Vec<MethodDescriptor> {
    match bindable_object(value) {
        Some(object) => introspect_object(object),
        None => Vec::new(),
    }
}

/// Descriptors of a bindable object's exported methods
pub fn introspect_object(object: &HostObject) -> Vec<MethodDescriptor> {
    let mut descriptors = object.descriptors();
    descriptors.sort_by(|a, b| a.name.cmp(&b.name));
    descriptors
}

/// Descriptors of a bindable type, without an instance
pub fn introspect_type<T: Bindable>() -> Vec<MethodDescriptor> {
    let mut descriptors: Vec<_> = T::methods().into_iter().map(|m| m.descriptor).collect();
    descriptors.sort_by(|a, b| a.name.cmp(&b.name));
    descriptors
}

/// Method table of an object, in introspection order
pub(crate) fn bound_methods(object: &HostObject) -> Vec<BoundMethod> {
    let mut methods = object.bound_methods();
    methods.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));
    methods
}

/// The bindable object behind a value, looking through `Some(..)` pointers
pub(crate) fn bindable_object(value: &HostValue) -> Option<&HostObject> {
    match value {
        HostValue::Object(object) => Some(object),
        HostValue::Pointer {
            value: Some(inner), ..
        } => bindable_object(inner),
        _ => None,
    }
}
