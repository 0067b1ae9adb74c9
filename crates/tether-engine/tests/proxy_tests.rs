//! Proxy binding tests
//!
//! A proxy is bound once against `Store`'s registry; the backing instance is
//! swapped through its `TargetCell`.

mod common;

use std::rc::Rc;

use common::{call, Engine, Store};
use tether_engine::{Bridge, ExceptionKind, Runtime, TargetCell};
use tether_sdk::{GuestContext, GuestValue};

#[test]
fn test_call_before_target_is_set() {
    let rt = Runtime::new();
    let (proxy, cell) = Bridge::new().bind_proxy::<Store>(&rt).unwrap();

    assert!(!cell.is_set());
    let err = call(&rt, &proxy, "name", &[]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(err.message, "Store target not set for proxy");
}

#[test]
fn test_unset_target_is_reported_before_arity() {
    let rt = Runtime::new();
    let (proxy, _cell) = Bridge::new().bind_proxy::<Store>(&rt).unwrap();

    let err = call(&rt, &proxy, "hit", &[]).unwrap_err();
    assert_eq!(err.message, "Store target not set for proxy");
}

#[test]
fn test_swap_without_rebinding() {
    let rt = Runtime::new();
    let (proxy, cell) = Bridge::new().bind_proxy::<Store>(&rt).unwrap();
    rt.set_global("store", proxy);
    let store = rt.global("store");

    let a = Store::named("a");
    let b = Store::named("b");

    cell.set(Rc::clone(&a));
    assert_eq!(call(&rt, &store, "name", &[]).unwrap(), GuestValue::from("a"));
    assert_eq!(
        call(&rt, &store, "hit", &[GuestValue::Int(2)]).unwrap(),
        GuestValue::Int(2)
    );

    let previous = cell.set(Rc::clone(&b)).unwrap();
    assert!(Rc::ptr_eq(&previous, &a));
    assert_eq!(call(&rt, &store, "name", &[]).unwrap(), GuestValue::from("b"));
    assert_eq!(
        call(&rt, &store, "hit", &[GuestValue::Int(1)]).unwrap(),
        GuestValue::Int(1)
    );

    assert_eq!(a.hits.get(), 2);
    assert_eq!(b.hits.get(), 1);
}

#[test]
fn test_clear_unsets_target() {
    let rt = Runtime::new();
    let (proxy, cell) = Bridge::new().bind_proxy::<Store>(&rt).unwrap();

    cell.set(Store::named("a"));
    assert!(call(&rt, &proxy, "name", &[]).is_ok());

    cell.clear();
    let err = call(&rt, &proxy, "name", &[]).unwrap_err();
    assert_eq!(err.message, "Store target not set for proxy");
}

#[test]
fn test_failed_call_leaves_cell_unchanged() {
    let rt = Runtime::new();
    let (proxy, cell) = Bridge::new().bind_proxy::<Store>(&rt).unwrap();
    let a = Store::named("a");
    cell.set(Rc::clone(&a));

    let err = call(&rt, &proxy, "hit", &["x".into()]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert!(Rc::ptr_eq(&cell.current().unwrap(), &a));
    assert_eq!(a.hits.get(), 0);

    assert_eq!(
        call(&rt, &proxy, "hit", &[GuestValue::Int(3)]).unwrap(),
        GuestValue::Int(3)
    );
}

#[test]
fn test_shared_cell_drives_several_bindings() {
    let bridge = Bridge::new();
    let cell = TargetCell::with_target(Store::named("first"));

    let rt_a = Runtime::new();
    let rt_b = Runtime::new();
    let proxy_a = bridge.bind_proxy_with(&rt_a, &cell).unwrap();
    let proxy_b = bridge.bind_proxy_with(&rt_b, &cell).unwrap();

    assert_eq!(call(&rt_a, &proxy_a, "name", &[]).unwrap(), GuestValue::from("first"));

    cell.set(Store::named("second"));
    assert_eq!(call(&rt_a, &proxy_a, "name", &[]).unwrap(), GuestValue::from("second"));
    assert_eq!(call(&rt_b, &proxy_b, "name", &[]).unwrap(), GuestValue::from("second"));
}

#[test]
fn test_proxy_results_are_wrapped() {
    let rt = Runtime::new();
    let (proxy, cell) = Bridge::new().bind_proxy::<Engine>(&rt).unwrap();
    cell.set(Rc::new(Engine::open("db")));

    let session = call(&rt, &proxy, "new_session", &[]).unwrap();
    assert_eq!(
        call(&rt, &session, "query", &["select".into()]).unwrap(),
        GuestValue::from("select@db")
    );

    cell.set(Rc::new(Engine::open("")));
    let err = call(&rt, &proxy, "ping", &[]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::Error);
    assert_eq!(err.message, "no dsn");
}

#[test]
fn test_proxy_exposes_type_method_set() {
    let rt = Runtime::new();
    let (proxy, _) = Bridge::new().bind_proxy::<Store>(&rt).unwrap();

    let keys = proxy.as_object().unwrap().keys();
    assert_eq!(keys, vec!["hit".to_string(), "name".to_string()]);
}
