//! Decision actions and the structural merge they map onto.

use crate::content::ContentItem;
use crate::value::{Map, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Action is an operator's choice for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Keep the stored version.
    Current,
    /// Replace with the incoming version.
    Incoming,
    /// Deep-merge incoming into current; incoming wins on conflicts.
    #[serde(alias = "merge")]
    Both,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Current => "current",
            Action::Incoming => "incoming",
            Action::Both => "both",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}', expected current, incoming or both")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Action::Current),
            "incoming" => Ok(Action::Incoming),
            "both" | "merge" => Ok(Action::Both),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Resolves the tree to persist for one decision.
///
/// Returns `None` only for `Current` when nothing is stored; the caller
/// skips that item.
pub fn resolve(current: Option<&Map>, incoming: &Map, action: Action) -> Option<Map> {
    match action {
        Action::Current => current.cloned(),
        Action::Incoming => Some(incoming.clone()),
        Action::Both => Some(match current {
            Some(current) => merge_maps(current, incoming),
            None => incoming.clone(),
        }),
    }
}

/// Deep-merges `incoming` into a copy of `current`.
///
/// Keys only in `incoming` are added, keys holding maps on both sides are
/// merged recursively, and every other collision takes the incoming value.
/// Lists are replaced whole, never concatenated.
pub fn merge_maps(current: &Map, incoming: &Map) -> Map {
    let mut out = current.clone();
    for (key, inc) in incoming.iter() {
        let merged = match (out.get(key), inc) {
            (Some(Value::Map(cur)), Value::Map(inc)) => Value::Map(merge_maps(cur, inc)),
            _ => inc.clone(),
        };
        out.set(key.clone(), merged);
    }
    out
}

/// Applies [`resolve`] to whole items.
///
/// Fields outside the body follow the side that supplied it: the stored
/// item for `Current`, the incoming item for `Incoming` and `Both`.
pub fn merge_item(
    current: Option<&ContentItem>,
    incoming: &ContentItem,
    action: Action,
) -> Option<ContentItem> {
    match action {
        Action::Current => current.cloned(),
        Action::Incoming => Some(incoming.clone()),
        Action::Both => {
            let body = resolve(current.map(ContentItem::body), incoming.body(), action)?;
            Some(incoming.with_body(body))
        }
    }
}
