//! Error types for file-level and session-level failures.
//!
//! Item-level problems (unknown decision keys, invalid identities, failed
//! writes) never surface as [`SyncError`]; they are counted in the
//! preview or the commit result instead.

use crate::repository::RepositoryError;
use std::path::Path;
use thiserror::Error;

/// SyncError aborts the current export, preview or commit call.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The payload could not be decoded or lacks required top-level fields.
    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },

    /// The payload carries an integrity tag that does not verify.
    #[error("integrity check failed, the file may have been tampered with: {reason}")]
    IntegrityMismatch { reason: String },

    #[error("invalid session state: {message}")]
    Session { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SyncError {
    /// Creates a malformed payload error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        SyncError::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// Creates an integrity mismatch error.
    pub fn integrity(reason: impl Into<String>) -> Self {
        SyncError::IntegrityMismatch {
            reason: reason.into(),
        }
    }

    /// Creates a session state error.
    pub fn session(message: impl Into<String>) -> Self {
        SyncError::Session {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SyncError::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it concerns.
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        SyncError::Io {
            context: format!("failed to {} {}", action, path.display()),
            source,
        }
    }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
