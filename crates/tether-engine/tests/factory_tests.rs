//! Global factory tests

mod common;

use common::{call, Engine};
use tether_engine::{BindOptions, Bridge, ExceptionKind, RebindMode, RebindPolicy, Runtime};
use tether_sdk::{FromHost, GuestValue, HostError, HostType, HostValue, IntoHost};

fn engine_factory(args: Vec<HostValue>) -> Result<HostValue, HostError> {
    let dsn = args
        .into_iter()
        .next()
        .map(String::from_host)
        .transpose()
        .map_err(|e| HostError::from_display(&e))?
        .unwrap_or_default();
    if dsn.is_empty() {
        return Err(HostError::new("empty dsn"));
    }
    Ok(Engine::open(dsn).into_host())
}

fn runtime_with_factory(bridge: &Bridge) -> Runtime {
    let rt = Runtime::new();
    bridge.register_factory(&rt, "engine", vec![HostType::String], engine_factory);
    rt
}

#[test]
fn test_factory_produces_bound_object() {
    let rt = runtime_with_factory(&Bridge::new());

    let engine = rt.call_global("engine", &["db".into()]).unwrap();
    assert_eq!(call(&rt, &engine, "dsn", &[]).unwrap(), GuestValue::from("db"));

    let session = call(&rt, &engine, "new_session", &[]).unwrap();
    assert_eq!(
        call(&rt, &session, "query", &["q".into()]).unwrap(),
        GuestValue::from("q@db")
    );
}

#[test]
fn test_factory_binds_regardless_of_rebind_policy() {
    let bridge = Bridge::with_options(
        BindOptions::default().with_rebind(RebindPolicy::Mode(RebindMode::None)),
    );
    let rt = runtime_with_factory(&bridge);

    let engine = rt.call_global("engine", &["db".into()]).unwrap();
    assert!(engine.as_object().is_some());
    assert_eq!(call(&rt, &engine, "ping", &[]).unwrap(), GuestValue::from("pong"));
}

#[test]
fn test_factory_arity_is_exact() {
    let rt = runtime_with_factory(&Bridge::new());

    let err = rt.call_global("engine", &[]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(err.message, "method engine requires 1 arguments, got 0");

    let err = rt
        .call_global("engine", &["a".into(), "b".into()])
        .unwrap_err();
    assert_eq!(err.message, "method engine requires 1 arguments, got 2");
}

#[test]
fn test_factory_argument_coercion() {
    let rt = runtime_with_factory(&Bridge::new());

    let err = rt.call_global("engine", &[GuestValue::Int(1)]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert!(err.message.starts_with("convert argument 0 for engine failed"));
}

#[test]
fn test_factory_error_is_raised_verbatim() {
    let rt = runtime_with_factory(&Bridge::new());

    let err = rt.call_global("engine", &["".into()]).unwrap_err();
    assert_eq!(err.kind, ExceptionKind::Error);
    assert_eq!(err.message, "empty dsn");
}

#[test]
fn test_factory_function_shape() {
    let rt = runtime_with_factory(&Bridge::new());

    let func = rt.global("engine");
    assert_eq!(rt.get_member(&func, "name").unwrap(), GuestValue::from("engine"));
    assert_eq!(rt.get_member(&func, "length").unwrap(), GuestValue::Int(1));
}

#[test]
fn test_factory_returning_plain_value() {
    let rt = Runtime::new();
    Bridge::new().register_factory(
        &rt,
        "answer",
        vec![],
        |_args: Vec<HostValue>| -> Result<HostValue, HostError> { Ok(HostValue::I64(42)) },
    );

    assert_eq!(rt.call_global("answer", &[]).unwrap(), GuestValue::Int(42));
}
