//! Diff result types.

use super::path::Path;
use crate::value::Value;
use serde::Serialize;
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How a single leaf differs between the current and incoming tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStatus {
    /// Present only on the incoming side.
    Added,
    /// Present only on the current side.
    Removed,
    /// Present on both sides with different values.
    Changed,
}

impl PathStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathStatus::Added => "added",
            PathStatus::Removed => "removed",
            PathStatus::Changed => "changed",
        }
    }

    /// The status seen from the other side of the comparison.
    pub fn inverse(&self) -> PathStatus {
        match self {
            PathStatus::Added => PathStatus::Removed,
            PathStatus::Removed => PathStatus::Added,
            PathStatus::Changed => PathStatus::Changed,
        }
    }
}

impl fmt::Display for PathStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PathDiff describes one differing leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathDiff {
    pub status: PathStatus,
    pub current: Option<Value>,
    pub incoming: Option<Value>,
}

impl PathDiff {
    pub fn added(incoming: Value) -> Self {
        PathDiff {
            status: PathStatus::Added,
            current: None,
            incoming: Some(incoming),
        }
    }

    pub fn removed(current: Value) -> Self {
        PathDiff {
            status: PathStatus::Removed,
            current: Some(current),
            incoming: None,
        }
    }

    pub fn changed(current: Value, incoming: Value) -> Self {
        PathDiff {
            status: PathStatus::Changed,
            current: Some(current),
            incoming: Some(incoming),
        }
    }

    /// Returns the same difference with the two sides exchanged.
    pub fn swapped(&self) -> PathDiff {
        PathDiff {
            status: self.status.inverse(),
            current: self.incoming.clone(),
            incoming: self.current.clone(),
        }
    }
}

/// FieldDiffs holds every differing leaf between two trees, keyed by path.
///
/// An empty set means the trees are equal after canonicalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldDiffs {
    entries: BTreeMap<Path, PathDiff>,
}

impl FieldDiffs {
    /// Creates a new empty FieldDiffs.
    pub fn new() -> Self {
        FieldDiffs {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, path: Path, diff: PathDiff) {
        self.entries.insert(path, diff);
    }

    /// Looks up a diff by its dot-joined path.
    pub fn get(&self, dotted: &str) -> Option<&PathDiff> {
        self.entries.get(&Path::parse(dotted))
    }

    /// Returns true if there are no differences.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Path, PathDiff> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys()
    }

    /// Top-level fields touched by at least one diff, in order.
    ///
    /// These are the field groups an operator reviews.
    pub fn fields(&self) -> BTreeSet<&str> {
        self.entries.keys().filter_map(Path::root).collect()
    }

    /// Returns true if every diff has the given status.
    pub fn all(&self, status: PathStatus) -> bool {
        self.entries.values().all(|d| d.status == status)
    }

    pub fn count(&self, status: PathStatus) -> usize {
        self.entries.values().filter(|d| d.status == status).count()
    }

    pub fn has_added(&self) -> bool {
        self.count(PathStatus::Added) > 0
    }

    pub fn has_removed(&self) -> bool {
        self.count(PathStatus::Removed) > 0
    }

    pub fn has_changed(&self) -> bool {
        self.count(PathStatus::Changed) > 0
    }

    /// Returns the diff seen from the other side.
    pub fn swapped(&self) -> FieldDiffs {
        FieldDiffs {
            entries: self
                .entries
                .iter()
                .map(|(path, diff)| (path.clone(), diff.swapped()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FieldDiffs {
    type Item = (&'a Path, &'a PathDiff);
    type IntoIter = btree_map::Iter<'a, Path, PathDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn write_side(f: &mut fmt::Formatter<'_>, side: &Option<Value>) -> fmt::Result {
    match side {
        Some(v) => match serde_json::to_string(v) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{:?}", v),
        },
        None => f.write_str("-"),
    }
}

impl fmt::Display for FieldDiffs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, diff)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let marker = match diff.status {
                PathStatus::Added => '+',
                PathStatus::Removed => '-',
                PathStatus::Changed => '~',
            };
            write!(f, "  {} {}: ", marker, path)?;
            write_side(f, &diff.current)?;
            f.write_str(" -> ")?;
            write_side(f, &diff.incoming)?;
        }
        Ok(())
    }
}
