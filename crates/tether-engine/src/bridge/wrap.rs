//! Result wrapping
//!
//! Bindable host objects returned from a call are re-bound into guest
//! objects with their own method tables, subject to the rebind policy.
//! Everything else goes through the runtime's generic conversion.

use std::rc::Rc;

use tether_sdk::{BridgeResult, GuestContext, GuestValue, HostValue};

use super::binder::bind_object;
use super::introspect::bindable_object;
use crate::config::BindOptions;

/// Guest-visible value for one host return value
pub(crate) fn wrap(
    ctx: &dyn GuestContext,
    options: &Rc<BindOptions>,
    value: HostValue,
) -> BridgeResult<GuestValue> {
    if let Some(object) = bindable_object(&value) {
        if options.rebind.allows(object.type_name()) {
            tracing::trace!(type_name = object.type_name(), "re-binding returned object");
            return bind_object(ctx, options, object);
        }
    }
    Ok(ctx.to_guest(value))
}

/// Guest-visible outcome of a call: nothing, one value, or an array
pub(crate) fn wrap_results(
    ctx: &dyn GuestContext,
    options: &Rc<BindOptions>,
    mut results: Vec<HostValue>,
) -> BridgeResult<GuestValue> {
    match results.len() {
        0 => Ok(GuestValue::Undefined),
        1 => match results.pop() {
            Some(value) => wrap(ctx, options, value),
            None => Ok(GuestValue::Undefined),
        },
        _ => {
            let items = results
                .into_iter()
                .map(|value| wrap(ctx, options, value))
                .collect::<BridgeResult<Vec<_>>>()?;
            Ok(ctx.new_array(items))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RebindMode, RebindPolicy};
    use crate::testing::Counter;
    use crate::vm::Runtime;
    use tether_sdk::IntoHost;

    #[test]
    fn test_zero_one_many() {
        let rt = Runtime::new();
        let options = Rc::new(BindOptions::default());

        assert!(wrap_results(&rt, &options, vec![]).unwrap().is_undefined());
        assert_eq!(
            wrap_results(&rt, &options, vec![HostValue::I64(1)]).unwrap(),
            GuestValue::Int(1)
        );
        let many = wrap_results(
            &rt,
            &options,
            vec![HostValue::I64(1), HostValue::String("a".into())],
        )
        .unwrap();
        let items = many.as_array().unwrap().to_vec();
        assert_eq!(items, vec![GuestValue::Int(1), GuestValue::from("a")]);
    }

    #[test]
    fn test_bindable_result_is_rebound() {
        let rt = Runtime::new();
        let options = Rc::new(BindOptions::default());
        let value = Counter::new(3).into_host();

        let guest = wrap(&rt, &options, value).unwrap();
        let obj = guest.as_object().unwrap();
        assert!(obj.get("get").as_function().is_some());
    }

    #[test]
    fn test_rebind_none_yields_handle() {
        let rt = Runtime::new();
        let options = Rc::new(
            BindOptions::default().with_rebind(RebindPolicy::Mode(RebindMode::None)),
        );
        let value = Counter::new(3).into_host();

        let guest = wrap(&rt, &options, value).unwrap();
        assert_eq!(guest.as_host().unwrap().type_name(), "Counter");
    }
}
