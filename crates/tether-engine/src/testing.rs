//! Shared fixtures for unit tests

use std::cell::Cell;

use tether_macros::bindable;

/// Counter with interior state
pub struct Counter {
    value: Cell<i64>,
}

impl Counter {
    pub fn new(start: i64) -> Self {
        Self {
            value: Cell::new(start),
        }
    }
}

#[bindable]
impl Counter {
    pub fn get(&self) -> i64 {
        self.value.get()
    }

    pub fn add(&self, delta: i64) {
        self.value.set(self.value.get() + delta);
    }
}
