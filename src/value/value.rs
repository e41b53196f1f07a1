//! Content trees: an order-preserving JSON value model.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Value is one node of a content tree as read from JSON or YAML.
///
/// Integers and floats are distinct: `1` and `1.0` are different values.
/// `Uint` only holds integers above `i64::MAX`; smaller ones decode as `Int`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

/// Map is a string-keyed map that keeps keys in insertion order.
///
/// Equality is structural and order-sensitive. Two maps holding the same
/// fields in a different order only compare equal after
/// [`canonicalize`](super::canonicalize).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Map {
    fields: Vec<(String, Value)>,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        if let Value::Map(m) = self {
            Some(m)
        } else {
            None
        }
    }
}

/// Floats compare by bit pattern, so `NaN` equals itself and `Eq` holds.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Uint(a), Uint(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

macro_rules! value_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i64 => Int,
    f64 => Float,
    &str => String,
    String => String,
    Map => Map,
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Uint(v),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl Map {
    pub fn new() -> Self {
        Map { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Map {
            fields: Vec::with_capacity(capacity),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|(name, _)| name == key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|i| &self.fields[i].1)
    }

    /// Sets `key` to `value`. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.fields[i].1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.position(key)?;
        Some(self.fields.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter().map(|(name, value)| (name, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Sorts fields by name. Values are left untouched.
    pub fn sort_keys(&mut self) {
        self.fields.sort_by(|a, b| a.0.cmp(&b.0));
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            out.serialize_entry(name, value)?;
        }
        out.end()
    }
}

impl<'de> Deserialize<'de> for Map {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = Map;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Map, A::Error> {
                let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    map.set(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}

/// Parses a JSON document into a [`Value`].
pub fn from_json(json: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a JSON object into a [`Map`]. Any other root is an error.
pub fn map_from_json(json: &str) -> Result<Map, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_int_and_float_are_distinct() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::from("x"), Value::String("x".into()));
    }

    #[test]
    fn test_map_set_get_remove() {
        let mut map = Map::new();
        assert!(map.is_empty());

        map.set("title", "Hello");
        assert!(map.has("title"));
        assert_eq!(map.get("title").and_then(Value::as_str), Some("Hello"));

        assert_eq!(map.remove("title"), Some(Value::from("Hello")));
        assert!(!map.has("title"));
        assert_eq!(map.remove("title"), None);
    }

    #[test]
    fn test_map_set_keeps_position() {
        let mut map = Map::new();
        map.set("b", 1i64);
        map.set("a", 2i64);
        map.set("b", 3i64);

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_json_preserves_key_order() {
        let json = r#"{"zeta":1,"alpha":{"y":true,"x":null}}"#;
        let value = from_json(json).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), json);
    }

    #[test]
    fn test_json_number_kinds() {
        let value = from_json(r#"{"i":3,"f":3.0,"n":-7}"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("i"), Some(&Value::Int(3)));
        assert_eq!(map.get("f"), Some(&Value::Float(3.0)));
        assert_eq!(map.get("n"), Some(&Value::Int(-7)));
    }

    #[test]
    fn test_large_unsigned_integers_decode_exactly() {
        let map = map_from_json(r#"{"max":18446744073709551615,"edge":9223372036854775808}"#).unwrap();
        assert_eq!(map.get("max"), Some(&Value::Uint(u64::MAX)));
        assert_eq!(map.get("edge"), Some(&Value::Uint(1 << 63)));
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"max":18446744073709551615,"edge":9223372036854775808}"#
        );
        assert_eq!(Value::from(7u64), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::Uint(u64::MAX));
    }

    #[test]
    fn test_order_sensitive_equality() {
        let a = map_from_json(r#"{"a":1,"b":2}"#).unwrap();
        let b = map_from_json(r#"{"b":2,"a":1}"#).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_map_from_json_rejects_non_object() {
        assert!(map_from_json("[1,2]").is_err());
    }

    #[test]
    fn test_yaml_document_decodes_as_map() {
        let map: Map = serde_yaml::from_str("title: Hello\ntags:\n  - a\n  - b\n").unwrap();
        assert_eq!(map.get("title").and_then(Value::as_str), Some("Hello"));
        assert_eq!(map.get("tags"), Some(&Value::from(vec!["a", "b"])));
    }
}
