//! Global factory functions
//!
//! A factory is a global guest function that builds a host object from its
//! arguments and hands back the bound object, e.g. `engine(driver, dsn)`.

use std::rc::Rc;

use tether_sdk::{
    BridgeResult, GuestContext, GuestValue, HostError, HostType, HostValue, MethodDescriptor,
};

use super::binder::{bind_object, call_bound};
use super::introspect::bindable_object;
use crate::config::BindOptions;

/// Host side of a factory: coerced arguments in, produced value or error out.
pub type FactoryFn = dyn Fn(Vec<HostValue>) -> Result<HostValue, HostError>;

/// Install `name` as a global factory taking exactly `params`.
pub(crate) fn register_factory(
    ctx: &dyn GuestContext,
    options: &Rc<BindOptions>,
    name: &str,
    params: Vec<HostType>,
    factory: Rc<FactoryFn>,
) {
    let descriptor = params
        .into_iter()
        .fold(MethodDescriptor::new(name), MethodDescriptor::param)
        .returns(HostType::Any)
        .fallible();
    let length = descriptor.fixed_arity();
    let opts = Rc::clone(options);
    let guest_name = name.to_string();

    let body = Rc::new(
        move |ctx: &dyn GuestContext, args: &[GuestValue]| -> BridgeResult<GuestValue> {
            let produce = |host_args: Vec<HostValue>| -> BridgeResult<Vec<HostValue>> {
                Ok(match factory(host_args) {
                    Ok(value) => vec![value, HostValue::Error(None)],
                    Err(err) => vec![HostValue::Error(Some(err))],
                })
            };
            let mut results = call_bound(ctx, &opts, &descriptor, &guest_name, args, produce)?;
            match results.pop() {
                Some(value) => match bindable_object(&value) {
                    Some(object) => bind_object(ctx, &opts, object),
                    None => Ok(ctx.to_guest(value)),
                },
                None => Ok(GuestValue::Undefined),
            }
        },
    );

    let func = ctx.new_function(name, length, false, body);
    ctx.set_global(name, GuestValue::Function(func));
    tracing::debug!(factory = name, params = length, "registered factory");
}
