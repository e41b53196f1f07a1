//! Item-level status derived from a set of path diffs.

use super::diffs::{FieldDiffs, PathStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ItemStatus is the display summary of one item's differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Create,
    Update,
    Delete,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Create => "create",
            ItemStatus::Update => "update",
            ItemStatus::Delete => "delete",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduces a diff set to a single status.
///
/// Every path added means `Create`, every path removed means `Delete`,
/// anything else is `Update`. Callers treat an empty set as a no-op and do
/// not summarize it; `Update` is returned for it only to keep the function
/// total.
pub fn summarize(diffs: &FieldDiffs) -> ItemStatus {
    if diffs.is_empty() {
        return ItemStatus::Update;
    }
    if diffs.all(PathStatus::Added) {
        ItemStatus::Create
    } else if diffs.all(PathStatus::Removed) {
        ItemStatus::Delete
    } else {
        ItemStatus::Update
    }
}
