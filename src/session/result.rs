//! Commit outcome counters.

use serde::Serialize;
use std::fmt;

/// ItemError records one item that could not be applied or previewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub key: String,
    pub message: String,
}

impl ItemError {
    /// Creates a new item error.
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        ItemError {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// ReconciliationResult accounts for every decision of a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<ItemError>,
}

impl ReconciliationResult {
    /// Creates a new empty result.
    pub fn new() -> Self {
        ReconciliationResult::default()
    }

    pub fn created() -> Self {
        ReconciliationResult {
            created: 1,
            ..Default::default()
        }
    }

    pub fn updated() -> Self {
        ReconciliationResult {
            updated: 1,
            ..Default::default()
        }
    }

    pub fn skipped() -> Self {
        ReconciliationResult {
            skipped: 1,
            ..Default::default()
        }
    }

    pub fn failed(key: impl Into<String>, message: impl Into<String>) -> Self {
        ReconciliationResult {
            errors: vec![ItemError::new(key, message)],
            ..Default::default()
        }
    }

    /// Adds `other` into this result. Counters sum and error lists append.
    pub fn absorb(&mut self, other: ReconciliationResult) {
        self.created += other.created;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.errors.extend(other.errors);
    }

    /// The number of decisions accounted for.
    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.errors.len()
    }

    /// Returns true if no write failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created: {}, updated: {}, skipped: {}, errors: {}",
            self.created,
            self.updated,
            self.skipped,
            self.errors.len()
        )
    }
}
