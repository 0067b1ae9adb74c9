//! Argument coercion
//!
//! Converts one guest argument into a host value of a declared type. The
//! runtime's own structural conversion is tried first; when it declines, the
//! exported value goes down the ladder, first match wins:
//!
//! 1. assignable: the value already has the target type (or the target is `any`)
//! 2. convertible: named types to and from their representation, `String` and
//!    `Vec<u8>`, collections element-wise, any non-nil value into `Option<T>`
//! 3. numeric: any number to any numeric type, truncating toward zero
//! 4. nil: zero value for nullable targets, and for the rest per `NullPolicy`
//! 5. unsupported, which also covers values with no finite host form

use std::collections::BTreeMap;
use std::fmt;

use tether_sdk::{BridgeError, BridgeResult, GuestContext, GuestValue, HostType, HostValue};

use crate::config::{BindOptions, NullPolicy};

/// Why a value could not be coerced
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// A numeric value does not fit the target
    OutOfRange(String),
    /// Null for a non-nullable target
    NullNotAllowed(String),
    /// One element of a collection failed
    Element {
        /// Index or key of the element
        at: String,
        /// The element's failure
        inner: Box<Failure>,
    },
    /// No rung of the ladder applies
    Unsupported {
        /// Type of the offered value
        got: String,
        /// Required type
        target: String,
    },
}

impl Failure {
    fn unsupported(value: &HostValue, target: &HostType) -> Self {
        Failure::Unsupported {
            got: value.type_name(),
            target: target.to_string(),
        }
    }

    fn element(at: impl fmt::Display, inner: Failure) -> Self {
        Failure::Element {
            at: at.to_string(),
            inner: Box::new(inner),
        }
    }

    /// Bridge error for argument `index` of `method`; `got` names the offered value's type
    pub fn into_error(
        self,
        method: &str,
        index: usize,
        target: &HostType,
        got: impl Into<String>,
    ) -> BridgeError {
        tracing::debug!(method, index, target = %target, failure = %self, "argument coercion failed");
        match self {
            Failure::Unsupported { .. } => BridgeError::UnsupportedConversion {
                method: method.to_string(),
                index,
                target: target.to_string(),
                got: got.into(),
            },
            other => BridgeError::Coercion {
                method: method.to_string(),
                index,
                target: target.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::OutOfRange(reason) => f.write_str(reason),
            Failure::NullNotAllowed(target) => write!(f, "null is not allowed for {}", target),
            Failure::Element { at, inner } => write!(f, "element {}: {}", at, inner),
            Failure::Unsupported { got, target } => {
                write!(f, "cannot use {} as {}", got, target)
            }
        }
    }
}

/// Coerce one guest argument at position `index` of `method`.
pub fn coerce_argument(
    ctx: &dyn GuestContext,
    options: &BindOptions,
    method: &str,
    index: usize,
    value: &GuestValue,
    target: &HostType,
) -> BridgeResult<HostValue> {
    if let Some(converted) = ctx.convert_to(value, target) {
        return Ok(converted);
    }

    let Some(exported) = ctx.export(value) else {
        let got = format!("cyclic or too deeply nested {}", value.type_name());
        let failure = Failure::Unsupported {
            got: got.clone(),
            target: target.to_string(),
        };
        return Err(failure.into_error(method, index, target, got));
    };
    coerce_value(exported, target, options.null_policy)
        .map_err(|failure| failure.into_error(method, index, target, value.type_name()))
}

/// Run the coercion ladder on an exported host value.
pub fn coerce_value(
    value: HostValue,
    target: &HostType,
    policy: NullPolicy,
) -> Result<HostValue, Failure> {
    if matches!(value, HostValue::Nil) {
        return coerce_nil(target, policy);
    }

    // 1. assignable
    if *target == HostType::Any || value.host_type() == *target {
        return Ok(value);
    }

    // 2. convertible
    if let Some(result) = convert(value.clone(), target, policy) {
        return result;
    }

    // 3. numeric
    if let Some(number) = value.as_number() {
        if let Some(result) = number.cast(target) {
            return result.map_err(Failure::OutOfRange);
        }
    }

    // nil was handled up front
    Err(Failure::unsupported(&value, target))
}

fn coerce_nil(target: &HostType, policy: NullPolicy) -> Result<HostValue, Failure> {
    let nullable = target.underlying().is_nullable();
    if !nullable && policy == NullPolicy::Strict {
        return Err(Failure::NullNotAllowed(target.to_string()));
    }
    target
        .zero_value()
        .ok_or_else(|| Failure::NullNotAllowed(target.to_string()))
}

/// The convertible rung. `None` means no conversion rule matches.
fn convert(
    value: HostValue,
    target: &HostType,
    policy: NullPolicy,
) -> Option<Result<HostValue, Failure>> {
    // named value: convert from its representation
    let value = match value {
        HostValue::Named { value: inner, .. } => {
            return Some(coerce_value(*inner, target, policy));
        }
        other => other,
    };

    match target {
        HostType::Named { name, underlying } => Some(
            coerce_value(value, underlying, policy).map(|inner| HostValue::named(*name, inner)),
        ),
        HostType::Pointer(elem) => Some(
            coerce_value(value, elem, policy)
                .map(|inner| HostValue::pointer((**elem).clone(), Some(inner))),
        ),
        HostType::Slice(elem) => match value {
            HostValue::String(s) if **elem == HostType::U8 => Some(Ok(HostValue::slice(
                HostType::U8,
                s.into_bytes().into_iter().map(HostValue::U8).collect(),
            ))),
            HostValue::Slice { items, .. } => Some(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        coerce_value(item, elem, policy).map_err(|f| Failure::element(i, f))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(|items| HostValue::slice((**elem).clone(), items)),
            ),
            _ => None,
        },
        HostType::String => match value {
            HostValue::Slice {
                elem: HostType::U8,
                items,
            } => {
                let bytes: Option<Vec<u8>> = items
                    .iter()
                    .map(|item| match item {
                        HostValue::U8(b) => Some(*b),
                        _ => None,
                    })
                    .collect();
                Some(
                    bytes
                        .and_then(|b| String::from_utf8(b).ok())
                        .map(HostValue::String)
                        .ok_or_else(|| Failure::OutOfRange("bytes are not valid UTF-8".to_string())),
                )
            }
            _ => None,
        },
        HostType::Map(elem) => match value {
            HostValue::Map { entries, .. } => Some(
                entries
                    .into_iter()
                    .map(|(k, v)| {
                        let converted =
                            coerce_value(v, elem, policy).map_err(|f| Failure::element(&k, f))?;
                        Ok((k, converted))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map(|entries| HostValue::Map {
                        value: (**elem).clone(),
                        entries,
                    }),
            ),
            _ => None,
        },
        HostType::Struct(ty) => match value {
            HostValue::Map { mut entries, .. } => Some(
                ty.fields
                    .iter()
                    .map(|(name, field_ty)| match entries.remove(*name) {
                        Some(v) => {
                            coerce_value(v, field_ty, policy).map_err(|f| Failure::element(name, f))
                        }
                        None => field_ty.zero_value().ok_or_else(|| {
                            Failure::element(name, Failure::NullNotAllowed(field_ty.to_string()))
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(|fields| HostValue::Struct {
                        ty: ty.clone(),
                        fields,
                    }),
            ),
            _ => None,
        },
        _ => None,
    }
}
