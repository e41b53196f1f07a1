//! # Content Sync
//!
//! Export structured content to a portable JSON file and re-import it
//! against a live store with a three-way reconciliation step.
//!
//! Import compares every incoming record with its stored counterpart,
//! lets an operator (or an automatic policy) keep the current version,
//! adopt the incoming one or merge both, and then writes the result.
//!
//! ## Modules
//!
//! - [`value`] - Order-preserving JSON trees and their canonical form
//! - [`diff`] - Field-level differences and per-item status
//! - [`content`] - The five content kinds, identity keys and grouping
//! - [`merge`] - Decision actions and the structural merge
//! - [`repository`] - Store traits and an in-memory snapshot store
//! - [`payload`] - The export document, its integrity tag and file I/O
//! - [`export`] - Building payloads from a content source
//! - [`session`] - The preview then commit reconciliation session
//! - [`config`] - YAML configuration with environment overrides

pub mod config;
pub mod content;
pub mod diff;
pub mod error;
pub mod export;
pub mod merge;
pub mod payload;
pub mod repository;
pub mod session;
pub mod value;

pub use config::SyncConfig;
pub use content::{ContentItem, ContentKind, GroupKey, IdentityKey};
pub use diff::{diff, summarize, FieldDiffs, ItemStatus, PathDiff, PathStatus};
pub use error::{Result, SyncError};
pub use export::{ExportRequest, Exporter};
pub use merge::{merge_maps, resolve, Action};
pub use payload::{ExportPayload, PayloadReader, PayloadWriter, Signer};
pub use repository::{ContentRepository, ContentSource, ExportFilter, MemoryStore, RepositoryError};
pub use session::{CommitPlan, Decision, Preview, ReconciliationResult, ReconciliationSession};
pub use value::{Map, Value};
