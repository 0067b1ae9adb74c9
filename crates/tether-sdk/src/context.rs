//! GuestContext trait - abstract runtime operations
//!
//! Defines the interface a guest runtime implements so the bridge can move
//! values across the boundary without depending on runtime internals.

use crate::error::BridgeResult;
use crate::host::{HostType, HostValue};
use crate::value::{GuestFunction, GuestValue, NativeFn};

/// Abstract guest runtime context.
///
/// The bridge only ever sees `&dyn GuestContext`. Raising a guest exception
/// is expressed by returning `Err` from a native function; the runtime turns
/// it into an exception at its call edge.
pub trait GuestContext {
    // ========================================================================
    // Value Exchange
    // ========================================================================

    /// Export a guest value to its natural host representation.
    ///
    /// Returns `None` when the value has no finite host form: an array or
    /// object that contains itself, or nesting past the runtime's limit.
    fn export(&self, value: &GuestValue) -> Option<HostValue>;

    /// Runtime-native structural conversion to `target`.
    ///
    /// Returns `None` when the runtime has no conversion for this pair, in
    /// which case the bridge falls back to its own coercion ladder.
    fn convert_to(&self, value: &GuestValue, target: &HostType) -> Option<HostValue>;

    /// Generic host-to-guest conversion
    fn to_guest(&self, value: HostValue) -> GuestValue;

    // ========================================================================
    // Value Creation
    // ========================================================================

    /// Create an empty guest object
    fn new_object(&self) -> GuestValue;

    /// Create a guest array
    fn new_array(&self, items: Vec<GuestValue>) -> GuestValue;

    /// Create a callable guest function backed by `call`
    fn new_function(&self, name: &str, length: usize, variadic: bool, call: NativeFn) -> GuestFunction;

    // ========================================================================
    // Members and Globals
    // ========================================================================

    /// Set a member on a guest object
    fn set_member(&self, target: &GuestValue, name: &str, value: GuestValue) -> BridgeResult<()>;

    /// Set a global binding
    fn set_global(&self, name: &str, value: GuestValue);
}
