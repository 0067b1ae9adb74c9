//! Host method bridge
//!
//! Exposes host objects to the guest runtime as objects with one callable
//! member per exported method. Each call coerces guest arguments to the
//! declared parameter types, invokes the host method, and wraps the results.
//!
//! # Example
//!
//! ```rust,ignore
//! let runtime = Runtime::new();
//! let bridge = Bridge::new();
//! let calc = bridge.bind(&runtime, Rc::new(Calculator))?;
//! runtime.set_global("calc", calc);
//! let five = runtime.call_member(&runtime.global("calc"), "sum", &[2.into(), 3.into()])?;
//! ```

mod binder;
mod call;
pub mod coerce;
mod factory;
mod introspect;
mod proxy;
pub mod variadic;
mod wrap;

pub use factory::FactoryFn;
pub use introspect::{introspect, introspect_object, introspect_type};
pub use proxy::TargetCell;

use std::rc::Rc;

use tether_sdk::{
    Bindable, BridgeResult, GuestContext, GuestValue, HostError, HostObject, HostType, HostValue,
};

use crate::config::BindOptions;

/// Binds host objects into a guest runtime under one set of options.
///
/// Cloning is cheap; clones share the options.
#[derive(Debug, Clone, Default)]
pub struct Bridge {
    options: Rc<BindOptions>,
}

impl Bridge {
    /// Bridge with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge with the given options
    pub fn with_options(options: BindOptions) -> Self {
        Self {
            options: Rc::new(options),
        }
    }

    /// Options in effect
    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// Bind every exported method of `instance` onto a new guest object.
    pub fn bind<T: Bindable>(&self, ctx: &dyn GuestContext, instance: Rc<T>) -> BridgeResult<GuestValue> {
        self.bind_object(ctx, &HostObject::new(instance))
    }

    /// Bind an already type-erased host object
    pub fn bind_object(&self, ctx: &dyn GuestContext, object: &HostObject) -> BridgeResult<GuestValue> {
        binder::bind_object(ctx, &self.options, object)
    }

    /// Bind any host value.
    ///
    /// Nil and values without methods produce an empty guest object.
    pub fn bind_value(&self, ctx: &dyn GuestContext, value: &HostValue) -> BridgeResult<GuestValue> {
        match introspect::bindable_object(value) {
            Some(object) => self.bind_object(ctx, object),
            None => {
                tracing::trace!(value = %value.type_name(), "no methods to bind");
                Ok(ctx.new_object())
            }
        }
    }

    /// Bind `T`'s methods against a new, empty target cell.
    ///
    /// Calls fail with `TargetUnset` until a target is installed.
    pub fn bind_proxy<T: Bindable>(
        &self,
        ctx: &dyn GuestContext,
    ) -> BridgeResult<(GuestValue, TargetCell<T>)> {
        let cell = TargetCell::new();
        let guest = proxy::bind_proxy(ctx, &self.options, &cell)?;
        Ok((guest, cell))
    }

    /// Bind `T`'s methods against an existing target cell
    pub fn bind_proxy_with<T: Bindable>(
        &self,
        ctx: &dyn GuestContext,
        cell: &TargetCell<T>,
    ) -> BridgeResult<GuestValue> {
        proxy::bind_proxy(ctx, &self.options, cell)
    }

    /// Install a global factory function `name` taking exactly `params`.
    ///
    /// A bindable result is always bound, whatever the rebind policy says.
    pub fn register_factory<F>(
        &self,
        ctx: &dyn GuestContext,
        name: &str,
        params: Vec<HostType>,
        factory: F,
    ) where
        F: Fn(Vec<HostValue>) -> Result<HostValue, HostError> + 'static,
    {
        factory::register_factory(ctx, &self.options, name, params, Rc::new(factory));
    }

    /// Call method `name` on a host value from the host side.
    ///
    /// `name` may be the declared or the guest-visible name. The trailing
    /// error slot is consumed; the other results are returned in order.
    pub fn call_method(
        &self,
        target: &HostValue,
        name: &str,
        args: Vec<HostValue>,
    ) -> BridgeResult<Vec<HostValue>> {
        call::call_method(&self.options, target, name, args)
    }

    /// Guest-visible method names of a host value
    pub fn method_names(&self, value: &HostValue) -> Vec<String> {
        call::method_names(&self.options, value)
    }
}
