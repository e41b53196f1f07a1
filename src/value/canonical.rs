//! Canonical form for order-independent comparison and signing.

use super::value::{Map, Value};
use serde::Serialize;

/// Returns the canonical form of `value`.
///
/// Map keys are sorted lexicographically at every level. List order is
/// significant and kept, with each element canonicalized. Scalars are copied.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Map(map) => Value::Map(canonicalize_map(map)),
        Value::List(items) => Value::List(items.iter().map(canonicalize).collect()),
        scalar => scalar.clone(),
    }
}

/// Map-level variant of [`canonicalize`].
pub fn canonicalize_map(map: &Map) -> Map {
    let mut out: Map = map.iter().map(|(k, v)| (k.clone(), canonicalize(v))).collect();
    out.sort_keys();
    out
}

/// Serializes `data` to compact JSON with every map's keys sorted.
///
/// The output is stable across key insertion order, which makes it suitable
/// as the input of an integrity tag. Numbers are encoded from the decoded
/// [`Value`], so two documents produce the same bytes only if they import
/// as the same content. Integers up to `u64::MAX` are exact.
pub fn canonical_json<T: Serialize + ?Sized>(data: &T) -> Result<Vec<u8>, serde_json::Error> {
    let text = serde_json::to_string(data)?;
    let value: Value = serde_json::from_str(&text)?;
    serde_json::to_vec(&canonicalize(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{from_json, map_from_json};
    use pretty_assertions::assert_eq;
    use crate::value::strategy::arb_value;
    use proptest::prelude::*;

    #[test]
    fn test_canonicalize_sorts_nested_keys() {
        let value = from_json(r#"{"b":{"z":1,"y":2},"a":[{"d":1,"c":2}]}"#).unwrap();
        let canon = canonicalize(&value);
        assert_eq!(
            serde_json::to_string(&canon).unwrap(),
            r#"{"a":[{"c":2,"d":1}],"b":{"y":2,"z":1}}"#
        );
    }

    #[test]
    fn test_canonicalize_keeps_list_order() {
        let value = from_json(r#"["b","a","c"]"#).unwrap();
        assert_eq!(canonicalize(&value), value);
    }

    #[test]
    fn test_canonicalize_does_not_mutate_input() {
        let map = map_from_json(r#"{"b":1,"a":2}"#).unwrap();
        let before = map.clone();
        let _ = canonicalize_map(&map);
        assert_eq!(map, before);
    }

    #[test]
    fn test_canonical_forms_match_regardless_of_order() {
        let a = map_from_json(r#"{"title":"x","meta":{"k":1,"j":[1,2]}}"#).unwrap();
        let b = map_from_json(r#"{"meta":{"j":[1,2],"k":1},"title":"x"}"#).unwrap();
        assert_ne!(a, b);
        assert_eq!(canonicalize_map(&a), canonicalize_map(&b));
    }

    #[test]
    fn test_canonical_json_is_order_independent() {
        let a = map_from_json(r#"{"x":1,"y":{"b":true,"a":null}}"#).unwrap();
        let b = map_from_json(r#"{"y":{"a":null,"b":true},"x":1}"#).unwrap();
        assert_eq!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
    }

    #[test]
    fn test_canonical_json_keeps_large_integers_apart() {
        let a = map_from_json(r#"{"n":18446744073709551615}"#).unwrap();
        let b = map_from_json(r#"{"n":18446744073709551614}"#).unwrap();
        assert_ne!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
    }

    proptest! {
        #[test]
        fn prop_canonicalize_is_idempotent(value in arb_value()) {
            let once = canonicalize(&value);
            prop_assert_eq!(canonicalize(&once), once);
        }
    }
}
