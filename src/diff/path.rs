//! Field path type.

use serde::{Serialize, Serializer};
use std::fmt;

/// Path is the sequence of map keys traversed to reach a leaf.
///
/// Rendered dot-joined (`seo.title`). `%` and `.` inside a key are
/// percent-escaped, so `{"a.b": ..}` renders as `a%2Eb` and never collides
/// with the nested path `a.b`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    elements: Vec<String>,
}

impl Path {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Path {
            elements: Vec::new(),
        }
    }

    /// Creates a path from a vector of keys.
    pub fn from_elements<S: Into<String>>(elements: Vec<S>) -> Self {
        Path {
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses the dot-joined form produced by `Display`.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Path::new();
        }
        Path {
            elements: dotted.split('.').map(unescape_key).collect(),
        }
    }

    /// Returns the number of keys in the path.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over the keys.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(String::as_str)
    }

    /// Returns the first key, the top-level field this path belongs to.
    pub fn root(&self) -> Option<&str> {
        self.elements.first().map(String::as_str)
    }

    /// Returns the last key.
    pub fn last(&self) -> Option<&str> {
        self.elements.last().map(String::as_str)
    }

    /// Creates a new path with `key` appended.
    pub fn with(&self, key: &str) -> Self {
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.extend(self.elements.iter().cloned());
        elements.push(key.to_string());
        Path { elements }
    }
}

fn escape_key(key: &str, out: &mut String) {
    for ch in key.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '.' => out.push_str("%2E"),
            _ => out.push(ch),
        }
    }
}

fn unescape_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(i) = rest.find('%') {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];
        if tail.starts_with("%25") {
            out.push('%');
            rest = &tail[3..];
        } else if tail.starts_with("%2E") {
            out.push('.');
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (i, key) in self.elements.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            escape_key(key, &mut out);
        }
        f.write_str(&out)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
