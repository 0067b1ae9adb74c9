//! GuestValue - dynamically typed values of the embedded runtime
//!
//! Primitives are stored inline. Arrays, objects, and functions are shared
//! handles: cloning a `GuestValue` clones the handle, never the contents, so
//! a bound object installed in two globals is the same object in both.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::GuestContext;
use crate::error::BridgeResult;
use crate::object::HostObject;

/// Native function body invoked by the runtime with the receiver-less argument list.
pub type NativeFn = Rc<dyn Fn(&dyn GuestContext, &[GuestValue]) -> BridgeResult<GuestValue>>;

// ============================================================================
// GuestValue
// ============================================================================

/// A guest runtime value.
#[derive(Clone, Default)]
pub enum GuestValue {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Integral number
    Int(i64),
    /// Floating-point number
    Float(f64),
    /// Immutable string
    String(Rc<str>),
    /// Shared array
    Array(GuestArray),
    /// Shared object with named members
    Object(GuestObject),
    /// Callable function
    Function(GuestFunction),
    /// Opaque handle to a host instance, exported without a method table
    Host(HostObject),
}

impl GuestValue {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        GuestValue::String(Rc::from(s.as_ref()))
    }

    /// Create an array value from its elements
    pub fn array(items: Vec<GuestValue>) -> Self {
        GuestValue::Array(GuestArray::new(items))
    }

    /// `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, GuestValue::Undefined)
    }

    /// `null`
    pub fn is_null(&self) -> bool {
        matches!(self, GuestValue::Null)
    }

    /// `null` or `undefined`
    pub fn is_nullish(&self) -> bool {
        matches!(self, GuestValue::Null | GuestValue::Undefined)
    }

    /// Get as boolean if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GuestValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an integer, or a float with no fractional part
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            GuestValue::Int(i) => Some(i),
            GuestValue::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                if f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Get as f64 if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            GuestValue::Int(i) => Some(i as f64),
            GuestValue::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GuestValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as array handle
    pub fn as_array(&self) -> Option<&GuestArray> {
        match self {
            GuestValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get as object handle
    pub fn as_object(&self) -> Option<&GuestObject> {
        match self {
            GuestValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Get as function handle
    pub fn as_function(&self) -> Option<&GuestFunction> {
        match self {
            GuestValue::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Get as opaque host handle
    pub fn as_host(&self) -> Option<&HostObject> {
        match self {
            GuestValue::Host(h) => Some(h),
            _ => None,
        }
    }

    /// Runtime type name, as `typeof` would report it (with `null` and `array` split out)
    pub fn type_name(&self) -> &'static str {
        match self {
            GuestValue::Undefined => "undefined",
            GuestValue::Null => "null",
            GuestValue::Bool(_) => "boolean",
            GuestValue::Int(_) | GuestValue::Float(_) => "number",
            GuestValue::String(_) => "string",
            GuestValue::Array(_) => "array",
            GuestValue::Object(_) | GuestValue::Host(_) => "object",
            GuestValue::Function(_) => "function",
        }
    }
}

impl PartialEq for GuestValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GuestValue::Undefined, GuestValue::Undefined) => true,
            (GuestValue::Null, GuestValue::Null) => true,
            (GuestValue::Bool(a), GuestValue::Bool(b)) => a == b,
            (GuestValue::String(a), GuestValue::String(b)) => a == b,
            (GuestValue::Array(a), GuestValue::Array(b)) => a.ptr_eq(b),
            (GuestValue::Object(a), GuestValue::Object(b)) => a.ptr_eq(b),
            (GuestValue::Function(a), GuestValue::Function(b)) => a == b,
            (GuestValue::Host(a), GuestValue::Host(b)) => a.ptr_eq(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

thread_local! {
    // containers currently being formatted on this thread
    static FORMATTING: RefCell<FxHashSet<*const ()>> = RefCell::new(FxHashSet::default());
}

struct Formatting(*const ());

impl Formatting {
    fn enter(id: *const ()) -> Option<Self> {
        FORMATTING
            .with(|active| active.borrow_mut().insert(id))
            .then_some(Formatting(id))
    }
}

impl Drop for Formatting {
    fn drop(&mut self) {
        FORMATTING.with(|active| active.borrow_mut().remove(&self.0));
    }
}

impl fmt::Debug for GuestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuestValue::Undefined => write!(f, "undefined"),
            GuestValue::Null => write!(f, "null"),
            GuestValue::Bool(b) => write!(f, "{}", b),
            GuestValue::Int(i) => write!(f, "{}", i),
            GuestValue::Float(x) => write!(f, "{:?}", x),
            GuestValue::String(s) => write!(f, "{:?}", s),
            GuestValue::Array(a) => {
                let Some(_guard) = Formatting::enter(a.id()) else {
                    return f.write_str("[Circular]");
                };
                f.debug_list().entries(a.to_vec()).finish()
            }
            GuestValue::Object(o) => {
                let Some(_guard) = Formatting::enter(o.id()) else {
                    return f.write_str("[Circular]");
                };
                let mut map = f.debug_map();
                for key in o.keys() {
                    map.entry(&key, &o.get(&key));
                }
                map.finish()
            }
            GuestValue::Function(func) => write!(f, "{:?}", func),
            GuestValue::Host(h) => write!(f, "{:?}", h),
        }
    }
}

impl From<bool> for GuestValue {
    fn from(b: bool) -> Self {
        GuestValue::Bool(b)
    }
}

impl From<i32> for GuestValue {
    fn from(i: i32) -> Self {
        GuestValue::Int(i as i64)
    }
}

impl From<i64> for GuestValue {
    fn from(i: i64) -> Self {
        GuestValue::Int(i)
    }
}

impl From<f64> for GuestValue {
    fn from(f: f64) -> Self {
        GuestValue::Float(f)
    }
}

impl From<&str> for GuestValue {
    fn from(s: &str) -> Self {
        GuestValue::string(s)
    }
}

impl From<String> for GuestValue {
    fn from(s: String) -> Self {
        GuestValue::String(Rc::from(s))
    }
}

impl From<GuestObject> for GuestValue {
    fn from(o: GuestObject) -> Self {
        GuestValue::Object(o)
    }
}

impl From<GuestFunction> for GuestValue {
    fn from(func: GuestFunction) -> Self {
        GuestValue::Function(func)
    }
}

// ============================================================================
// Arrays
// ============================================================================

/// Shared, mutable guest array.
#[derive(Clone, Default)]
pub struct GuestArray(Rc<RefCell<Vec<GuestValue>>>);

impl GuestArray {
    /// Create an array holding `items`
    pub fn new(items: Vec<GuestValue>) -> Self {
        GuestArray(Rc::new(RefCell::new(items)))
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the array has no elements
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Element at `index`, or `undefined`
    pub fn get(&self, index: usize) -> GuestValue {
        self.0.borrow().get(index).cloned().unwrap_or_default()
    }

    /// Append an element
    pub fn push(&self, value: GuestValue) {
        self.0.borrow_mut().push(value);
    }

    /// Snapshot of the elements
    pub fn to_vec(&self) -> Vec<GuestValue> {
        self.0.borrow().clone()
    }

    /// Whether both handles refer to the same array
    pub fn ptr_eq(&self, other: &GuestArray) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the shared storage
    pub fn id(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

// ============================================================================
// Objects
// ============================================================================

#[derive(Default)]
struct Members {
    order: Vec<Rc<str>>,
    slots: FxHashMap<Rc<str>, GuestValue>,
}

/// Shared, mutable guest object. Members keep insertion order.
#[derive(Clone, Default)]
pub struct GuestObject(Rc<RefCell<Members>>);

impl GuestObject {
    /// Create an empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Member value, or `undefined` when absent
    pub fn get(&self, name: &str) -> GuestValue {
        self.0.borrow().slots.get(name).cloned().unwrap_or_default()
    }

    /// Set or replace a member
    pub fn set(&self, name: &str, value: GuestValue) {
        let mut members = self.0.borrow_mut();
        if let Some(slot) = members.slots.get_mut(name) {
            *slot = value;
            return;
        }
        let key: Rc<str> = Rc::from(name);
        members.order.push(key.clone());
        members.slots.insert(key, value);
    }

    /// Whether a member exists
    pub fn has(&self, name: &str) -> bool {
        self.0.borrow().slots.contains_key(name)
    }

    /// Member names in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().order.iter().map(|k| k.to_string()).collect()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.0.borrow().order.len()
    }

    /// Whether the object has no members
    pub fn is_empty(&self) -> bool {
        self.0.borrow().order.is_empty()
    }

    /// Whether both handles refer to the same object
    pub fn ptr_eq(&self, other: &GuestObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the shared storage
    pub fn id(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

// ============================================================================
// Functions
// ============================================================================

struct FunctionData {
    name: String,
    length: usize,
    variadic: bool,
    call: NativeFn,
}

/// Callable guest function backed by a native body.
#[derive(Clone)]
pub struct GuestFunction(Rc<FunctionData>);

impl GuestFunction {
    /// Create a function.
    ///
    /// `length` is the declared parameter count; `variadic` marks a trailing
    /// rest parameter.
    pub fn new(name: impl Into<String>, length: usize, variadic: bool, call: NativeFn) -> Self {
        GuestFunction(Rc::new(FunctionData {
            name: name.into(),
            length,
            variadic,
            call,
        }))
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Declared parameter count
    pub fn length(&self) -> usize {
        self.0.length
    }

    /// Whether the last parameter is a rest parameter
    pub fn is_variadic(&self) -> bool {
        self.0.variadic
    }

    /// Invoke the function
    pub fn call(&self, ctx: &dyn GuestContext, args: &[GuestValue]) -> BridgeResult<GuestValue> {
        (self.0.call)(ctx, args)
    }
}

impl PartialEq for GuestFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for GuestFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.0.name)
    }
}

/// Host-side view of a guest callback parameter; `None` is "no function".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Callback(pub Option<GuestFunction>);

impl Callback {
    /// Invoke the callback, yielding `undefined` when absent
    pub fn call(&self, ctx: &dyn GuestContext, args: &[GuestValue]) -> BridgeResult<GuestValue> {
        match &self.0 {
            Some(func) => func.call(ctx, args),
            None => Ok(GuestValue::Undefined),
        }
    }

    /// Whether a function is present
    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }
}
