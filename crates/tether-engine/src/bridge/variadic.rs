//! Variadic tail assembly
//!
//! Guest arguments past the fixed parameters become one `Vec<E>` argument.
//! A lone guest array in that position stands for the whole tail when
//! `spread_variadic_array` is enabled.

use tether_sdk::{BridgeResult, GuestContext, GuestValue, HostType, HostValue};

use super::coerce::coerce_argument;
use crate::config::BindOptions;

/// Build the variadic slice from `rest`, the arguments after `fixed` fixed ones.
pub fn expand(
    ctx: &dyn GuestContext,
    options: &BindOptions,
    method: &str,
    fixed: usize,
    rest: &[GuestValue],
    elem: &HostType,
) -> BridgeResult<HostValue> {
    let items = match spread_source(options, rest) {
        Some(elements) => elements
            .iter()
            .map(|element| coerce_argument(ctx, options, method, fixed, element, elem))
            .collect::<BridgeResult<Vec<_>>>()?,
        None => rest
            .iter()
            .enumerate()
            .map(|(i, arg)| coerce_argument(ctx, options, method, fixed + i, arg, elem))
            .collect::<BridgeResult<Vec<_>>>()?,
    };

    tracing::trace!(method, count = items.len(), "assembled variadic tail");
    Ok(HostValue::slice(elem.clone(), items))
}

/// Elements of a lone array argument, when it stands for the whole tail
fn spread_source(options: &BindOptions, rest: &[GuestValue]) -> Option<Vec<GuestValue>> {
    if !options.spread_variadic_array {
        return None;
    }
    match rest {
        [GuestValue::Array(items)] => Some(items.to_vec()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::Runtime;
    use tether_sdk::BridgeError;

    fn ints(values: &[i64]) -> HostValue {
        HostValue::slice(HostType::I64, values.iter().copied().map(HostValue::I64).collect())
    }

    #[test]
    fn test_spread_and_expanded_forms_agree() {
        let rt = Runtime::new();
        let options = BindOptions::default();
        let expanded = [GuestValue::Int(1), GuestValue::Int(2), GuestValue::Int(3)];
        let spread = [GuestValue::array(expanded.to_vec())];

        let a = expand(&rt, &options, "vsum", 1, &expanded, &HostType::I64).unwrap();
        let b = expand(&rt, &options, "vsum", 1, &spread, &HostType::I64).unwrap();
        assert_eq!(a, ints(&[1, 2, 3]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_tail() {
        let rt = Runtime::new();
        let tail = expand(&rt, &BindOptions::default(), "vsum", 1, &[], &HostType::I64).unwrap();
        assert_eq!(tail, ints(&[]));
    }

    #[test]
    fn test_spread_disabled_treats_array_as_element() {
        let rt = Runtime::new();
        let options = BindOptions::default().with_spread_variadic_array(false);
        let spread = [GuestValue::array(vec![GuestValue::Int(1)])];

        let tail = expand(&rt, &options, "vany", 0, &spread, &HostType::Any).unwrap();
        match tail {
            HostValue::Slice { items, .. } => {
                assert_eq!(items.len(), 1);
                assert!(matches!(items[0], HostValue::Slice { .. }));
            }
            other => panic!("expected slice, got {:?}", other),
        }
    }

    #[test]
    fn test_element_failure_reports_position() {
        let rt = Runtime::new();
        let args = [GuestValue::Int(1), GuestValue::from("x")];
        let err = expand(&rt, &BindOptions::default(), "vsum", 1, &args, &HostType::I64)
            .unwrap_err();
        match err {
            BridgeError::UnsupportedConversion { index, .. } => assert_eq!(index, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
