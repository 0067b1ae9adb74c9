//! Invocation binder
//!
//! Builds one guest function per exported method and runs the call
//! pipeline: arity check, fixed argument coercion, variadic assembly, host
//! call, trailing error check, result wrapping. Direct and proxy bindings
//! share the pipeline and differ only in how the target is resolved.

use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use rustc_hash::FxHashSet;
use tether_sdk::{
    BoundMethod, BridgeError, BridgeResult, GuestContext, GuestValue, HostCall, HostObject,
    HostValue, MethodDescriptor, NativeFn,
};

use super::coerce::coerce_argument;
use super::introspect;
use super::variadic;
use super::wrap;
use crate::config::BindOptions;

/// Bind every exported method of `object` onto a fresh guest object.
pub(crate) fn bind_object(
    ctx: &dyn GuestContext,
    options: &Rc<BindOptions>,
    object: &HostObject,
) -> BridgeResult<GuestValue> {
    let methods = introspect::bound_methods(object)
        .into_iter()
        .map(|BoundMethod { descriptor, call }| (descriptor, call));
    let make_body = |descriptor: MethodDescriptor, guest_name: String, call: HostCall| -> NativeFn {
        let opts = Rc::clone(options);
        Rc::new(
            move |ctx: &dyn GuestContext, args: &[GuestValue]| -> BridgeResult<GuestValue> {
                invoke(ctx, &opts, &descriptor, &guest_name, args, |host_args| {
                    call(host_args)
                })
            },
        )
    };
    let guest = install_methods(ctx, options, object.type_name(), methods, make_body)?;
    tracing::debug!(type_name = object.type_name(), "bound host object");
    Ok(guest)
}

/// Install one guest function per method on a fresh guest object.
///
/// `make_body` builds the function body from the descriptor, the guest
/// name, and the method's handle. A later method whose guest name collides
/// replaces the earlier one.
pub(crate) fn install_methods<H>(
    ctx: &dyn GuestContext,
    options: &BindOptions,
    type_name: &str,
    methods: impl IntoIterator<Item = (MethodDescriptor, H)>,
    make_body: impl Fn(MethodDescriptor, String, H) -> NativeFn,
) -> BridgeResult<GuestValue> {
    let guest = ctx.new_object();
    let mut seen = FxHashSet::default();

    for (descriptor, handle) in methods {
        let name = options.naming.apply(&descriptor.name);
        if !seen.insert(name.clone()) {
            tracing::warn!(
                type_name,
                method = %name,
                "guest method name collision; later method wins"
            );
        }

        let length = descriptor.fixed_arity();
        let variadic = descriptor.has_variadic();
        let body = make_body(descriptor, name.clone(), handle);
        let func = ctx.new_function(&name, length, variadic, body);
        ctx.set_member(&guest, &name, GuestValue::Function(func))?;
    }

    tracing::trace!(type_name, methods = seen.len(), "installed guest methods");
    Ok(guest)
}

/// Run the call pipeline for one invocation with an already resolved target.
pub(crate) fn invoke<F>(
    ctx: &dyn GuestContext,
    options: &Rc<BindOptions>,
    descriptor: &MethodDescriptor,
    guest_name: &str,
    args: &[GuestValue],
    call: F,
) -> BridgeResult<GuestValue>
where
    F: FnOnce(Vec<HostValue>) -> BridgeResult<Vec<HostValue>>,
{
    let results = call_bound(ctx, options, descriptor, guest_name, args, call)?;
    wrap::wrap_results(ctx, options, results)
}

/// Arity, coercion, host call, and error check; returns the visible results.
pub(crate) fn call_bound<F>(
    ctx: &dyn GuestContext,
    options: &BindOptions,
    descriptor: &MethodDescriptor,
    guest_name: &str,
    args: &[GuestValue],
    call: F,
) -> BridgeResult<Vec<HostValue>>
where
    F: FnOnce(Vec<HostValue>) -> BridgeResult<Vec<HostValue>>,
{
    tracing::trace!(method = guest_name, argc = args.len(), "invoking host method");

    check_arity(descriptor, guest_name, args.len())?;

    let fixed = descriptor.fixed_arity();
    let mut host_args = Vec::with_capacity(fixed + usize::from(descriptor.has_variadic()));
    for (index, (arg, ty)) in args.iter().zip(descriptor.params.iter()).enumerate() {
        host_args.push(coerce_argument(ctx, options, guest_name, index, arg, ty)?);
    }
    if let Some(elem) = &descriptor.variadic {
        host_args.push(variadic::expand(
            ctx,
            options,
            guest_name,
            fixed,
            &args[fixed..],
            elem,
        )?);
    }

    let results = call_host(options, guest_name, call, host_args)?;
    take_error(descriptor, guest_name, results)
}

/// Reject argument counts the signature cannot accept
pub(crate) fn check_arity(
    descriptor: &MethodDescriptor,
    method: &str,
    got: usize,
) -> BridgeResult<()> {
    if descriptor.accepts(got) {
        return Ok(());
    }
    Err(BridgeError::Arity {
        method: method.to_string(),
        required: descriptor.fixed_arity(),
        shape: descriptor.arity_shape(),
        got,
    })
}

/// Invoke the host, turning a panic into an error when enabled
pub(crate) fn call_host<F>(
    options: &BindOptions,
    method: &str,
    call: F,
    args: Vec<HostValue>,
) -> BridgeResult<Vec<HostValue>>
where
    F: FnOnce(Vec<HostValue>) -> BridgeResult<Vec<HostValue>>,
{
    if !options.catch_panics {
        return call(args);
    }
    match panic::catch_unwind(AssertUnwindSafe(|| call(args))) {
        Ok(result) => result,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            tracing::debug!(method, %message, "host method panicked");
            Err(BridgeError::Panic {
                method: method.to_string(),
                message,
            })
        }
    }
}

/// Consume the trailing error slot, raising it when set
pub(crate) fn take_error(
    descriptor: &MethodDescriptor,
    method: &str,
    mut results: Vec<HostValue>,
) -> BridgeResult<Vec<HostValue>> {
    if !descriptor.last_return_is_error {
        return Ok(results);
    }
    match results.pop() {
        Some(HostValue::Error(Some(err))) => {
            tracing::debug!(method, error = %err, "host method returned an error");
            Err(BridgeError::HostMethod(err))
        }
        Some(HostValue::Error(None)) => Ok(results),
        other => {
            // never drop a real result standing where the error slot belongs
            let got = other.map_or_else(|| "nothing".to_string(), |value| value.type_name());
            tracing::warn!(method, %got, "fallible host method returned no error slot");
            Err(BridgeError::mismatch("error", got))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::Runtime;
    use tether_sdk::{ArityShape, HostError, HostType};

    fn sum_descriptor() -> MethodDescriptor {
        MethodDescriptor::new("Sum")
            .param(HostType::I64)
            .param(HostType::I64)
            .returns(HostType::I64)
            .fallible()
    }

    #[test]
    fn test_arity_exact() {
        let desc = sum_descriptor();
        assert!(check_arity(&desc, "Sum", 2).is_ok());
        let err = check_arity(&desc, "Sum", 3).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Arity {
                required: 2,
                shape: ArityShape::Exact,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_arity_variadic_minimum() {
        let desc = MethodDescriptor::new("Vsum")
            .param(HostType::String)
            .variadic(HostType::I64);
        assert!(check_arity(&desc, "Vsum", 1).is_ok());
        assert!(check_arity(&desc, "Vsum", 4).is_ok());
        let err = check_arity(&desc, "Vsum", 0).unwrap_err();
        assert_eq!(err.to_string(), "method Vsum requires 1 arguments+variadic, got 0");
    }

    #[test]
    fn test_take_error_consumes_nil_slot() {
        let desc = sum_descriptor();
        let results = take_error(
            &desc,
            "Sum",
            vec![HostValue::I64(5), HostValue::Error(None)],
        )
        .unwrap();
        assert_eq!(results, vec![HostValue::I64(5)]);
    }

    #[test]
    fn test_take_error_raises_verbatim() {
        let desc = sum_descriptor();
        let err = take_error(
            &desc,
            "Sum",
            vec![HostValue::Error(Some(HostError::new("neg")))],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "neg");
    }

    #[test]
    fn test_take_error_rejects_missing_slot() {
        let desc = sum_descriptor();
        let err = take_error(&desc, "Sum", vec![HostValue::I64(5)]).unwrap_err();
        assert!(matches!(
            &err,
            BridgeError::TypeMismatch { expected, got } if expected == "error" && got == "i64"
        ));

        let err = take_error(&desc, "Sum", vec![]).unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch: expected error, got nothing");
    }

    #[test]
    fn test_take_error_ignores_infallible_methods() {
        let desc = MethodDescriptor::new("Get").returns(HostType::I64);
        assert_eq!(
            take_error(&desc, "Get", vec![HostValue::I64(1)]).unwrap(),
            vec![HostValue::I64(1)]
        );
    }

    #[test]
    fn test_install_methods_later_name_wins() {
        let rt = Runtime::new();
        let options = BindOptions::default();
        let methods = vec![
            (MethodDescriptor::new("get").returns(HostType::I64), 1i64),
            (MethodDescriptor::new("get").returns(HostType::I64), 2i64),
        ];
        let make_body = |_descriptor: MethodDescriptor, _name: String, value: i64| -> NativeFn {
            Rc::new(move |_ctx: &dyn GuestContext, _args: &[GuestValue]| -> BridgeResult<GuestValue> {
                Ok(GuestValue::Int(value))
            })
        };

        let guest = install_methods(&rt, &options, "Pair", methods, make_body).unwrap();
        assert_eq!(guest.as_object().unwrap().keys(), vec!["get".to_string()]);
        assert_eq!(rt.call_member(&guest, "get", &[]).unwrap(), GuestValue::Int(2));
    }

    #[test]
    fn test_panic_is_contained() {
        let options = BindOptions::default();
        let err = call_host(
            &options,
            "Boom",
            |_args| -> BridgeResult<Vec<HostValue>> { panic!("kaboom") },
            Vec::new(),
        )
        .unwrap_err();
        match err {
            BridgeError::Panic { method, message } => {
                assert_eq!(method, "Boom");
                assert_eq!(message, "kaboom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
