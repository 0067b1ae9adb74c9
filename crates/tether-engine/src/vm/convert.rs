//! Value exchange between guest values and host values
//!
//! `export` gives the natural host form of a guest value. `convert_to` is the
//! runtime's structural conversion toward a declared host type; it declines
//! (returns `None`) rather than failing, so the bridge's own coercion rules
//! decide what happens next. `to_guest` is the generic conversion back.
//!
//! Both guest-to-host directions walk shared arrays and objects, which may
//! contain themselves. A container already on the descent path, or nesting
//! deeper than `MAX_DEPTH`, makes the whole conversion yield `None`.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use tether_sdk::{GuestObject, GuestValue, HostType, HostValue};

/// Deepest array/object nesting the guest-to-host conversions will walk
pub const MAX_DEPTH: usize = 256;

/// Containers on the current descent path
#[derive(Default)]
struct Path(FxHashSet<*const ()>);

impl Path {
    /// Run `f` inside container `id`; `None` on a cycle or past `MAX_DEPTH`
    fn descend<T>(&mut self, id: *const (), f: impl FnOnce(&mut Path) -> Option<T>) -> Option<T> {
        if self.0.len() >= MAX_DEPTH || !self.0.insert(id) {
            return None;
        }
        let out = f(self);
        self.0.remove(&id);
        out
    }
}

/// Natural host form of a guest value
pub fn export(value: &GuestValue) -> Option<HostValue> {
    export_in(value, &mut Path::default())
}

fn export_in(value: &GuestValue, path: &mut Path) -> Option<HostValue> {
    Some(match value {
        GuestValue::Undefined | GuestValue::Null => HostValue::Nil,
        GuestValue::Bool(b) => HostValue::Bool(*b),
        GuestValue::Int(i) => HostValue::I64(*i),
        GuestValue::Float(f) => HostValue::F64(*f),
        GuestValue::String(s) => HostValue::String(s.to_string()),
        GuestValue::Array(items) => {
            let exported = path.descend(items.id(), |path| {
                items
                    .to_vec()
                    .iter()
                    .map(|item| export_in(item, path))
                    .collect::<Option<Vec<_>>>()
            })?;
            HostValue::slice(HostType::Any, exported)
        }
        GuestValue::Object(obj) => {
            let entries = path.descend(obj.id(), |path| {
                obj.keys()
                    .into_iter()
                    .map(|k| {
                        let v = export_in(&obj.get(&k), path)?;
                        Some((k, v))
                    })
                    .collect::<Option<BTreeMap<_, _>>>()
            })?;
            HostValue::Map {
                value: HostType::Any,
                entries,
            }
        }
        GuestValue::Function(func) => HostValue::Func(Some(func.clone())),
        GuestValue::Host(h) => HostValue::Object(h.clone()),
    })
}

/// Structural conversion of a guest value to `target`.
///
/// Null and undefined are never converted here.
pub fn convert_to(value: &GuestValue, target: &HostType) -> Option<HostValue> {
    if value.is_nullish() {
        return None;
    }
    convert_inner(value, target, &mut Path::default())
}

fn convert_inner(value: &GuestValue, target: &HostType, path: &mut Path) -> Option<HostValue> {
    if value.is_nullish() {
        // nested null: only nullable element types take it
        return if target.is_nullable() {
            target.zero_value()
        } else {
            None
        };
    }

    match target {
        HostType::Any => export_in(value, path),
        HostType::Bool => value.as_bool().map(HostValue::Bool),
        HostType::String => value.as_str().map(|s| HostValue::String(s.to_string())),
        t if t.is_float() => {
            let f = value.as_f64()?;
            Some(match t {
                HostType::F32 => HostValue::F32(f as f32),
                _ => HostValue::F64(f),
            })
        }
        t if t.is_integer() => {
            let i = value.as_i64()?;
            tether_sdk::Number::Int(i as i128).cast(t)?.ok()
        }
        HostType::Func => value.as_function().map(|f| HostValue::Func(Some(f.clone()))),
        HostType::Pointer(elem) => {
            let inner = convert_inner(value, elem, path)?;
            Some(HostValue::pointer((**elem).clone(), Some(inner)))
        }
        HostType::Slice(elem) => {
            let arr = value.as_array()?;
            let converted = path.descend(arr.id(), |path| {
                arr.to_vec()
                    .iter()
                    .map(|item| convert_inner(item, elem, path))
                    .collect::<Option<Vec<_>>>()
            })?;
            Some(HostValue::slice((**elem).clone(), converted))
        }
        HostType::Map(elem) => {
            let obj = value.as_object()?;
            let entries = path.descend(obj.id(), |path| {
                obj.keys()
                    .into_iter()
                    .map(|key| {
                        let v = convert_inner(&obj.get(&key), elem, path)?;
                        Some((key, v))
                    })
                    .collect::<Option<BTreeMap<_, _>>>()
            })?;
            Some(HostValue::Map {
                value: (**elem).clone(),
                entries,
            })
        }
        HostType::Struct(ty) => {
            let obj = value.as_object()?;
            let fields = path.descend(obj.id(), |path| {
                ty.fields
                    .iter()
                    .map(|(name, field_ty)| convert_field(obj, name, field_ty, path))
                    .collect::<Option<Vec<_>>>()
            })?;
            Some(HostValue::Struct {
                ty: ty.clone(),
                fields,
            })
        }
        HostType::Named { name, underlying } => {
            let inner = convert_inner(value, underlying, path)?;
            Some(HostValue::named(*name, inner))
        }
        HostType::Object(name) => match value.as_host() {
            Some(h) if h.type_name() == *name => Some(HostValue::Object(h.clone())),
            _ => None,
        },
        _ => None,
    }
}

fn convert_field(obj: &GuestObject, name: &str, ty: &HostType, path: &mut Path) -> Option<HostValue> {
    if !obj.has(name) {
        return ty.zero_value();
    }
    let value = obj.get(name);
    if value.is_nullish() {
        return ty.zero_value();
    }
    convert_inner(&value, ty, path)
}

/// Generic host-to-guest conversion
pub fn to_guest(value: HostValue) -> GuestValue {
    match value {
        HostValue::Nil => GuestValue::Null,
        HostValue::Bool(b) => GuestValue::Bool(b),
        HostValue::I8(v) => GuestValue::Int(v as i64),
        HostValue::I16(v) => GuestValue::Int(v as i64),
        HostValue::I32(v) => GuestValue::Int(v as i64),
        HostValue::I64(v) => GuestValue::Int(v),
        HostValue::U8(v) => GuestValue::Int(v as i64),
        HostValue::U16(v) => GuestValue::Int(v as i64),
        HostValue::U32(v) => GuestValue::Int(v as i64),
        HostValue::U64(v) => match i64::try_from(v) {
            Ok(i) => GuestValue::Int(i),
            Err(_) => GuestValue::Float(v as f64),
        },
        HostValue::F32(v) => GuestValue::Float(v as f64),
        HostValue::F64(v) => GuestValue::Float(v),
        HostValue::String(s) => GuestValue::from(s),
        HostValue::Pointer { value, .. } => match value {
            Some(inner) => to_guest(*inner),
            None => GuestValue::Null,
        },
        HostValue::Slice { items, .. } => {
            GuestValue::array(items.into_iter().map(to_guest).collect())
        }
        HostValue::Map { entries, .. } => {
            let obj = GuestObject::new();
            for (k, v) in entries {
                obj.set(&k, to_guest(v));
            }
            GuestValue::Object(obj)
        }
        HostValue::Func(func) => match func {
            Some(f) => GuestValue::Function(f),
            None => GuestValue::Null,
        },
        HostValue::Struct { ty, fields } => {
            let obj = GuestObject::new();
            for ((name, _), v) in ty.fields.iter().zip(fields) {
                obj.set(name, to_guest(v));
            }
            GuestValue::Object(obj)
        }
        HostValue::Named { value, .. } => to_guest(*value),
        HostValue::Object(h) => GuestValue::Host(h),
        HostValue::Error(err) => match err {
            Some(e) => GuestValue::from(e.message()),
            None => GuestValue::Null,
        },
    }
}
