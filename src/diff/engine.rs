//! Deep diff of two content trees.

use super::diffs::{FieldDiffs, PathDiff};
use super::path::Path;
use crate::value::{canonicalize_map, Map, Value};

/// Computes the leaf-level differences between `current` and `incoming`.
///
/// Both trees are canonicalized first so key order never produces a diff.
/// A missing `current` is treated as an empty map. Lists are compared as
/// whole values: replacing one element reports the entire list as changed.
/// A key holding `null` is treated the same as a missing key.
pub fn diff(current: Option<&Map>, incoming: &Map) -> FieldDiffs {
    let empty = Map::new();
    let current = canonicalize_map(current.unwrap_or(&empty));
    let incoming = canonicalize_map(incoming);

    let mut out = FieldDiffs::new();
    walk(&Path::new(), Some(&current), Some(&incoming), &mut out);
    out
}

fn walk(prefix: &Path, current: Option<&Map>, incoming: Option<&Map>, out: &mut FieldDiffs) {
    let empty = Map::new();
    let current = current.unwrap_or(&empty);
    let incoming = incoming.unwrap_or(&empty);

    // Union of keys, sorted.
    let mut keys: Vec<&str> = current.keys().chain(incoming.keys()).collect();
    keys.sort_unstable();
    keys.dedup();

    for key in keys {
        let path = prefix.with(key);
        let cur = present(current.get(key));
        let inc = present(incoming.get(key));

        match (cur, inc) {
            (None | Some(Value::Map(_)), None | Some(Value::Map(_))) if cur.is_some() || inc.is_some() => {
                walk(&path, cur.and_then(Value::as_map), inc.and_then(Value::as_map), out);
            }
            _ => compare_leaf(path, cur, inc, out),
        }
    }
}

fn compare_leaf(path: Path, current: Option<&Value>, incoming: Option<&Value>, out: &mut FieldDiffs) {
    match (current, incoming) {
        (None, Some(inc)) => out.insert(path, PathDiff::added(inc.clone())),
        (Some(cur), None) => out.insert(path, PathDiff::removed(cur.clone())),
        (Some(cur), Some(inc)) if cur != inc => {
            out.insert(path, PathDiff::changed(cur.clone(), inc.clone()))
        }
        _ => {}
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}
