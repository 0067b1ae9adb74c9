//! Proxy bindings
//!
//! A proxy binding is built from a type's method registry rather than from
//! an instance. Every call reads the current target from a shared
//! `TargetCell`, so the backing instance can be replaced at any time without
//! rebinding.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (guest, cell) = bridge.bind_proxy::<Engine>(&runtime)?;
//! runtime.set_global("db", guest);
//! cell.set(Rc::new(Engine::open("a.db")?));
//! // later
//! cell.set(Rc::new(Engine::open("b.db")?));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tether_sdk::{
    Bindable, BridgeError, BridgeResult, GuestContext, GuestValue, Invoker, Method,
    MethodDescriptor, NativeFn,
};

use super::binder::{install_methods, invoke};
use crate::config::BindOptions;

/// Swappable single-slot reference to the current proxy target.
///
/// Clones share the slot. Replacement is a plain swap with no history; the
/// cell performs no locking and is confined to one thread.
pub struct TargetCell<T> {
    slot: Rc<RefCell<Option<Rc<T>>>>,
}

impl<T> Clone for TargetCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: Bindable> Default for TargetCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Bindable> TargetCell<T> {
    /// Create an empty cell
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Create a cell holding `target`
    pub fn with_target(target: Rc<T>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(target))),
        }
    }

    /// Install `target`, returning the previous one
    pub fn set(&self, target: Rc<T>) -> Option<Rc<T>> {
        tracing::debug!(type_name = T::TYPE_NAME, "proxy target replaced");
        self.slot.replace(Some(target))
    }

    /// Remove the current target
    pub fn clear(&self) -> Option<Rc<T>> {
        tracing::debug!(type_name = T::TYPE_NAME, "proxy target cleared");
        self.slot.replace(None)
    }

    /// The current target, if any
    pub fn current(&self) -> Option<Rc<T>> {
        self.slot.borrow().clone()
    }

    /// Whether a target is installed
    pub fn is_set(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl<T: Bindable> fmt::Debug for TargetCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetCell")
            .field("type_name", &T::TYPE_NAME)
            .field("is_set", &self.is_set())
            .finish()
    }
}

/// Bind every exported method of `T` against `cell`.
pub(crate) fn bind_proxy<T: Bindable>(
    ctx: &dyn GuestContext,
    options: &Rc<BindOptions>,
    cell: &TargetCell<T>,
) -> BridgeResult<GuestValue> {
    let mut methods = T::methods();
    methods.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));
    let methods = methods
        .into_iter()
        .map(|Method { descriptor, invoke }| (descriptor, invoke));

    let make_body = |descriptor: MethodDescriptor, guest_name: String, invoker: Invoker<T>| -> NativeFn {
        let opts = Rc::clone(options);
        let cell = cell.clone();
        Rc::new(
            move |ctx: &dyn GuestContext, args: &[GuestValue]| -> BridgeResult<GuestValue> {
                // the cell borrow ends here; the host may repoint its own proxy
                let target = cell.current().ok_or_else(|| BridgeError::TargetUnset {
                    type_name: T::TYPE_NAME.to_string(),
                })?;
                invoke(ctx, &opts, &descriptor, &guest_name, args, |host_args| {
                    invoker(&target, host_args)
                })
            },
        )
    };
    let guest = install_methods(ctx, options, T::TYPE_NAME, methods, make_body)?;
    tracing::debug!(type_name = T::TYPE_NAME, "bound proxy");
    Ok(guest)
}
