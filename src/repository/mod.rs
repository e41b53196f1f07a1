//! Repository module - The seam between the reconciliation core and a
//! content store.
//!
//! The core needs three capabilities to import ([`ContentRepository`]) and
//! one to export ([`ContentSource`]). Each receives a typed [`IdentityKey`]
//! or [`ContentKind`] and dispatches on it in one place.

mod filter;
mod memory;

pub use filter::*;
pub use memory::*;

use crate::content::{ContentItem, ContentKind, IdentityKey};
use thiserror::Error;

/// RepositoryError is a failure reported by a store for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("{key}: not found")]
    NotFound { key: String },

    #[error("{key}: already exists")]
    AlreadyExists { key: String },

    #[error("{key}: {reason}")]
    Unsupported { key: String, reason: String },

    #[error("{message}")]
    Backend { message: String },
}

impl RepositoryError {
    pub fn not_found(key: &IdentityKey) -> Self {
        RepositoryError::NotFound {
            key: key.to_string(),
        }
    }

    pub fn already_exists(key: &IdentityKey) -> Self {
        RepositoryError::AlreadyExists {
            key: key.to_string(),
        }
    }

    pub fn unsupported(key: &IdentityKey, reason: impl Into<String>) -> Self {
        RepositoryError::Unsupported {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        RepositoryError::Backend {
            message: message.into(),
        }
    }
}

/// Read and write access to live content, used by import.
///
/// Calls are synchronous. Retries, if any, are the implementation's concern.
pub trait ContentRepository {
    /// Looks up the stored record for `key`.
    fn find_current(&self, key: &IdentityKey) -> Result<Option<ContentItem>, RepositoryError>;

    /// Stores a new record and returns its key.
    fn create(&mut self, item: &ContentItem) -> Result<IdentityKey, RepositoryError>;

    /// Replaces the stored record at `key`.
    fn update(&mut self, key: &IdentityKey, item: &ContentItem) -> Result<(), RepositoryError>;
}

/// Listing access to live content, used by export.
pub trait ContentSource {
    fn list(
        &self,
        kind: ContentKind,
        filter: &ExportFilter,
    ) -> Result<Vec<ContentItem>, RepositoryError>;
}

impl<R: ContentRepository + ?Sized> ContentRepository for &mut R {
    fn find_current(&self, key: &IdentityKey) -> Result<Option<ContentItem>, RepositoryError> {
        (**self).find_current(key)
    }

    fn create(&mut self, item: &ContentItem) -> Result<IdentityKey, RepositoryError> {
        (**self).create(item)
    }

    fn update(&mut self, key: &IdentityKey, item: &ContentItem) -> Result<(), RepositoryError> {
        (**self).update(key, item)
    }
}
