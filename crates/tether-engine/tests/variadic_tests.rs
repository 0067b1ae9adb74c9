//! Variadic invocation tests

mod common;

use common::{arr, call, setup};
use tether_engine::{BindOptions, Bridge, ExceptionKind};
use tether_sdk::GuestValue;

fn ints(values: &[i64]) -> Vec<GuestValue> {
    values.iter().copied().map(GuestValue::Int).collect()
}

#[test]
fn test_expanded_and_array_forms_agree() {
    let (rt, d, _) = setup(&Bridge::new());

    let mut expanded = vec![GuestValue::from("p")];
    expanded.extend(ints(&[1, 2, 3]));
    let spread = vec![GuestValue::from("p"), arr(ints(&[1, 2, 3]))];

    let a = call(&rt, &d, "vsum", &expanded).unwrap();
    let b = call(&rt, &d, "vsum", &spread).unwrap();
    assert_eq!(a, GuestValue::from("p:3:6"));
    assert_eq!(a, b);
}

#[test]
fn test_empty_tail() {
    let (rt, d, _) = setup(&Bridge::new());

    assert_eq!(
        call(&rt, &d, "vsum", &["p".into()]).unwrap(),
        GuestValue::from("p:0:0")
    );
    assert_eq!(
        call(&rt, &d, "vsum", &["p".into(), arr(vec![])]).unwrap(),
        GuestValue::from("p:0:0")
    );
    assert_eq!(call(&rt, &d, "join", &[]).unwrap(), GuestValue::from(""));
}

#[test]
fn test_too_few_arguments_reports_minimum() {
    let (rt, d, dummy) = setup(&Bridge::new());

    let err = call(&rt, &d, "vsum", &[]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(err.message, "method vsum requires 1 arguments+variadic, got 0");
    assert_eq!(dummy.call_count(), 0);
}

#[test]
fn test_float_elements_are_coerced() {
    let (rt, d, _) = setup(&Bridge::new());

    let args = [
        GuestValue::from("f"),
        GuestValue::Float(1.0),
        GuestValue::Float(2.9),
    ];
    assert_eq!(call(&rt, &d, "vsum", &args).unwrap(), GuestValue::from("f:2:3"));
}

#[test]
fn test_bad_element_names_its_position() {
    let (rt, d, _) = setup(&Bridge::new());

    let args = [GuestValue::from("p"), GuestValue::Int(1), GuestValue::from("x")];
    let err = call(&rt, &d, "vsum", &args).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert!(err.message.starts_with("convert argument 2 for vsum failed"));
}

#[test]
fn test_array_among_several_tail_arguments_is_an_element() {
    let (rt, d, _) = setup(&Bridge::new());

    let args = [GuestValue::from("p"), arr(ints(&[1])), GuestValue::Int(2)];
    let err = call(&rt, &d, "vsum", &args).unwrap_err();
    assert!(err.message.starts_with("convert argument 1 for vsum failed"));
}

#[test]
fn test_spread_can_be_disabled() {
    let bridge = Bridge::with_options(BindOptions::default().with_spread_variadic_array(false));
    let (rt, d, _) = setup(&bridge);

    let err = call(&rt, &d, "vsum", &["p".into(), arr(ints(&[1, 2]))]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);

    // string elements still pass one by one
    let parts = ["a".into(), "b".into()];
    assert_eq!(call(&rt, &d, "join", &parts).unwrap(), GuestValue::from("a,b"));
}

#[test]
fn test_variadic_only_method() {
    let (rt, d, _) = setup(&Bridge::new());

    let parts = [GuestValue::from("a"), GuestValue::from("b"), GuestValue::from("c")];
    assert_eq!(call(&rt, &d, "join", &parts).unwrap(), GuestValue::from("a,b,c"));
    assert_eq!(
        call(&rt, &d, "join", &[arr(parts.to_vec())]).unwrap(),
        GuestValue::from("a,b,c")
    );
}
