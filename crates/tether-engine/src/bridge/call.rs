//! Host-side dynamic calls
//!
//! Calls an exported method by name with `HostValue` arguments, without a
//! guest runtime. Arguments go through the same coercion ladder as guest
//! calls.

use tether_sdk::{BridgeError, BridgeResult, HostValue};

use super::binder::{call_host, check_arity, take_error};
use super::coerce::coerce_value;
use super::introspect::{bindable_object, bound_methods, introspect};
use crate::config::BindOptions;

/// Call `name` on `target`; returns every visible result.
pub(crate) fn call_method(
    options: &BindOptions,
    target: &HostValue,
    name: &str,
    args: Vec<HostValue>,
) -> BridgeResult<Vec<HostValue>> {
    let object = match bindable_object(target) {
        Some(object) => object,
        None if target.is_nil() => return Err(BridgeError::NilTarget),
        None => return Err(BridgeError::NotAnObject(target.type_name())),
    };

    let method = bound_methods(object)
        .into_iter()
        .find(|m| m.descriptor.name == name || options.naming.apply(&m.descriptor.name) == name)
        .ok_or_else(|| BridgeError::MethodNotFound(name.to_string()))?;
    let descriptor = &method.descriptor;

    check_arity(descriptor, name, args.len())?;

    let fixed = descriptor.fixed_arity();
    let mut host_args = Vec::with_capacity(fixed + 1);
    let mut tail = Vec::new();
    for (index, arg) in args.into_iter().enumerate() {
        let target_ty = match descriptor.params.get(index) {
            Some(ty) => ty,
            None => match &descriptor.variadic {
                Some(elem) => elem,
                None => break,
            },
        };
        let got = arg.type_name();
        let coerced = coerce_value(arg, target_ty, options.null_policy)
            .map_err(|failure| failure.into_error(name, index, target_ty, got))?;
        if index < fixed {
            host_args.push(coerced);
        } else {
            tail.push(coerced);
        }
    }
    if let Some(elem) = &descriptor.variadic {
        host_args.push(HostValue::slice(elem.clone(), tail));
    }

    let call = &method.call;
    let results = call_host(options, name, |host_args| call(host_args), host_args)?;
    take_error(descriptor, name, results)
}

/// Exported method names of a host value, in introspection order
pub(crate) fn method_names(options: &BindOptions, value: &HostValue) -> Vec<String> {
    introspect(value)
        .into_iter()
        .map(|d| options.naming.apply(&d.name))
        .collect()
}
