//! Proptest strategies for nested values.

use super::value::{Map, Value};
use proptest::prelude::*;

/// Arbitrary nested value with small, collision-prone keys.
pub(crate) fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (1u64 << 63..=u64::MAX).prop_map(Value::Uint),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::vec(("[a-e]{1,3}", inner), 0..5)
                .prop_map(|fields| Value::Map(fields.into_iter().collect())),
        ]
    })
}

/// Arbitrary top-level content body.
pub(crate) fn arb_map() -> impl Strategy<Value = Map> {
    prop::collection::vec(("[a-e]{1,3}", arb_value()), 0..6)
        .prop_map(|fields| fields.into_iter().collect())
}
