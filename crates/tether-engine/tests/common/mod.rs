//! Shared fixtures for bridge integration tests
//!
//! - `Dummy`: one method per calling shape (plain, fallible, variadic,
//!   multi-return, nullable, numeric, collection, struct, callback, panicking)
//! - `Engine` / `Session` / `Wrapper`: bindable types returned from calls
//!   and passed back in as handles
//! - `Store`: a stateful type for proxy tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tether_engine::{Bridge, Exception, Runtime};
use tether_macros::{bindable, HostStruct};
use tether_sdk::{Callback, GuestContext, GuestValue};

#[derive(Debug, Clone, HostStruct)]
pub struct Small {
    pub a: i64,
    pub b: String,
}

#[derive(Debug, Clone, Copy, HostStruct)]
pub struct UserId(pub i64);

#[derive(Default)]
pub struct Dummy {
    pub calls: Cell<u32>,
    pub seen: RefCell<Vec<String>>,
    pub callback: RefCell<Callback>,
}

impl Dummy {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, what: impl Into<String>) {
        self.calls.set(self.calls.get() + 1);
        self.seen.borrow_mut().push(what.into());
    }
}

#[bindable]
impl Dummy {
    pub fn no_arg(&self) -> i64 {
        42
    }

    pub fn echo(&self, s: String) -> String {
        format!("hi:{}", s)
    }

    pub fn sum(&self, a: i64, b: i64) -> Result<i64, String> {
        self.record("sum");
        if a < 0 {
            return Err("neg".to_string());
        }
        Ok(a + b)
    }

    #[bind(variadic)]
    pub fn vsum(&self, prefix: String, nums: Vec<i64>) -> String {
        format!("{}:{}:{}", prefix, nums.len(), nums.iter().sum::<i64>())
    }

    #[bind(variadic)]
    pub fn join(&self, parts: Vec<String>) -> String {
        parts.join(",")
    }

    pub fn void(&self) {
        self.record("void");
    }

    pub fn only_err(&self, fail: bool) -> Result<(), String> {
        self.record("only_err");
        if fail {
            return Err("only_err failed".to_string());
        }
        Ok(())
    }

    pub fn two_vals(&self) -> (i64, String) {
        (7, "seven".to_string())
    }

    pub fn two_vals_err(&self, fail: bool) -> Result<(i64, String), String> {
        if fail {
            return Err("two_vals_err failed".to_string());
        }
        Ok((1, "one".to_string()))
    }

    pub fn takes_int64(&self, v: i64) -> i64 {
        v
    }

    pub fn takes_uint(&self, v: u64) -> u64 {
        v
    }

    pub fn uint32_add1(&self, v: u32) -> u32 {
        v + 1
    }

    pub fn float_add_half(&self, v: f64) -> f64 {
        v + 0.5
    }

    pub fn takes_int8(&self, v: i8) -> i8 {
        v
    }

    pub fn ptr_arg(&self, p: Option<i64>) -> String {
        match p {
            Some(v) => format!("ptr:{}", v),
            None => "nil".to_string(),
        }
    }

    pub fn takes_map(&self, m: HashMap<String, i64>) -> String {
        if m.is_empty() {
            return "empty".to_string();
        }
        let mut keys: Vec<_> = m.keys().cloned().collect();
        keys.sort();
        keys.join(",")
    }

    pub fn takes_slice(&self, items: Vec<String>) -> usize {
        items.len()
    }

    pub fn grid_sum(&self, rows: Vec<Vec<i64>>) -> i64 {
        rows.iter().flatten().sum()
    }

    pub fn takes_bytes(&self, bytes: Vec<u8>) -> usize {
        bytes.len()
    }

    pub fn wants_struct(&self, s: Small) -> String {
        format!("{}:{}", s.a, s.b)
    }

    pub fn takes_user_id(&self, id: UserId) -> i64 {
        id.0
    }

    pub fn user_id(&self, raw: i64) -> UserId {
        UserId(raw)
    }

    pub fn small(&self) -> Small {
        Small {
            a: 1,
            b: "x".to_string(),
        }
    }

    pub fn on_event(&self, cb: Callback) -> bool {
        let present = cb.is_some();
        *self.callback.borrow_mut() = cb;
        present
    }

    pub fn boom(&self) -> i64 {
        panic!("boom")
    }

    pub fn call_count(&self) -> u32 {
        self.calls.get()
    }

    #[bind(skip)]
    pub fn skipped(&self) -> i64 {
        0
    }

    #[allow(dead_code)]
    fn private_helper(&self) -> i64 {
        0
    }
}

pub struct Engine {
    pub dsn: String,
    opened: Cell<u32>,
}

impl Engine {
    pub fn open(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            opened: Cell::new(0),
        }
    }
}

#[bindable]
impl Engine {
    pub fn dsn(&self) -> String {
        self.dsn.clone()
    }

    pub fn new_session(&self) -> Rc<Session> {
        self.opened.set(self.opened.get() + 1);
        Rc::new(Session {
            id: self.opened.get(),
            dsn: self.dsn.clone(),
        })
    }

    pub fn ping(&self) -> Result<String, String> {
        if self.dsn.is_empty() {
            return Err("no dsn".to_string());
        }
        Ok("pong".to_string())
    }
}

pub struct Session {
    pub id: u32,
    pub dsn: String,
}

#[bindable]
impl Session {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn query(&self, sql: String) -> String {
        format!("{}@{}", sql, self.dsn)
    }
}

#[derive(Default)]
pub struct Wrapper {
    engine: RefCell<Option<Rc<Engine>>>,
}

#[bindable]
impl Wrapper {
    pub fn set_engine(&self, engine: Rc<Engine>) {
        *self.engine.borrow_mut() = Some(engine);
    }

    pub fn engine_dsn(&self) -> Option<String> {
        self.engine.borrow().as_ref().map(|e| e.dsn.clone())
    }
}

pub struct Store {
    pub name: String,
    pub hits: Cell<i64>,
}

impl Store {
    pub fn named(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            hits: Cell::new(0),
        })
    }
}

#[bindable]
impl Store {
    pub fn name(&self) -> String {
        self.name.clone()
    }

    pub fn hit(&self, by: i64) -> i64 {
        self.hits.set(self.hits.get() + by);
        self.hits.get()
    }
}

/// Runtime with a `Dummy` bound as the global `d`
pub fn setup(bridge: &Bridge) -> (Runtime, GuestValue, Rc<Dummy>) {
    let rt = Runtime::new();
    let dummy = Rc::new(Dummy::new());
    let guest = bridge
        .bind(&rt, Rc::clone(&dummy))
        .expect("binding Dummy failed");
    rt.set_global("d", guest.clone());
    (rt, guest, dummy)
}

/// Call `target.name(args)`
pub fn call(
    rt: &Runtime,
    target: &GuestValue,
    name: &str,
    args: &[GuestValue],
) -> Result<GuestValue, Exception> {
    rt.call_member(target, name, args)
}

/// Guest array holding `items`
pub fn arr(items: Vec<GuestValue>) -> GuestValue {
    GuestValue::array(items)
}
