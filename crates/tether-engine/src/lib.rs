//! Tether engine - binds host object methods into a guest runtime
//!
//! This crate provides:
//! - `bridge`: introspection, argument coercion, variadic expansion, direct
//!   and proxy binding, result wrapping, and global factories
//! - `config`: binding options loaded from TOML
//! - `vm`: a reference guest runtime implementing `GuestContext`
//!
//! Host types opt in with `#[tether_macros::bindable]`; see `tether-sdk` for
//! the type model.

#![warn(missing_docs)]

pub mod bridge;
pub mod config;
pub mod vm;

#[cfg(test)]
mod testing;

pub use bridge::{introspect, introspect_object, introspect_type, Bridge, FactoryFn, TargetCell};
pub use config::{BindOptions, ConfigError, Naming, NullPolicy, RebindMode, RebindPolicy};
pub use vm::{Exception, ExceptionKind, Runtime};
