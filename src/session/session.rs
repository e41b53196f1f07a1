//! The preview then commit state machine.

use super::decision::{CommitPlan, Decision};
use super::result::{ItemError, ReconciliationResult};
use crate::content::{ContentItem, ContentKind, GroupKey, IdentityKey};
use crate::diff::{diff, summarize, FieldDiffs, ItemStatus};
use crate::error::{Result, SyncError};
use crate::merge::merge_item;
use crate::payload::ExportPayload;
use crate::repository::{ContentRepository, RepositoryError};
use crate::value::canonicalize_map;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

/// DiffEntry is one surfaced item: its identity, status and differences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub key: String,
    #[serde(skip)]
    pub identity: IdentityKey,
    pub status: ItemStatus,
    pub diffs: FieldDiffs,
    /// The stored record found at preview time.
    pub current: Option<ContentItem>,
    pub incoming: ContentItem,
}

impl DiffEntry {
    pub fn group(&self) -> GroupKey {
        self.identity.group()
    }
}

/// Preview is the grouped result of comparing a payload with the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// container -> locale -> entries, each in payload order.
    pub groups: BTreeMap<String, BTreeMap<String, Vec<DiffEntry>>>,
    /// Items that could not be previewed.
    pub rejected: Vec<ItemError>,
    /// Items whose trees already match the store.
    pub unchanged: usize,
    #[serde(skip)]
    order: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, (GroupKey, usize)>,
}

impl Preview {
    /// Creates a new empty preview for `kind`.
    pub fn new(kind: ContentKind) -> Self {
        Preview {
            kind,
            groups: BTreeMap::new(),
            rejected: Vec::new(),
            unchanged: 0,
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn push(&mut self, entry: DiffEntry) {
        let group = entry.group();
        let bucket = self
            .groups
            .entry(group.container.clone())
            .or_default()
            .entry(group.locale.clone())
            .or_default();
        self.order.push(entry.key.clone());
        self.index.insert(entry.key.clone(), (group, bucket.len()));
        bucket.push(entry);
    }

    /// Looks up a surfaced entry by its key.
    pub fn entry(&self, key: &str) -> Option<&DiffEntry> {
        let (group, position) = self.index.get(key)?;
        self.groups
            .get(&group.container)?
            .get(&group.locale)?
            .get(*position)
    }

    /// Surfaced entries in payload order.
    pub fn entries(&self) -> impl Iterator<Item = &DiffEntry> + '_ {
        self.order.iter().filter_map(move |key| self.entry(key))
    }

    /// Entries of one `(container, locale)` bucket.
    pub fn group(&self, container: &str, locale: &str) -> &[DiffEntry] {
        self.groups
            .get(container)
            .and_then(|locales| locales.get(locale))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of surfaced entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} to review, {} unchanged, {} rejected",
            self.kind,
            self.len(),
            self.unchanged,
            self.rejected.len()
        )?;
        for (container, locales) in &self.groups {
            for (locale, entries) in locales {
                writeln!(f, "{}", GroupKey::new(container.as_str(), locale.as_str()))?;
                for entry in entries {
                    writeln!(f, "  [{}] {}", entry.status, entry.key)?;
                    for line in entry.diffs.to_string().lines() {
                        writeln!(f, "  {}", line)?;
                    }
                }
            }
        }
        for rejected in &self.rejected {
            writeln!(f, "rejected {}", rejected)?;
        }
        Ok(())
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Previewed,
    Committed,
}

enum Stage {
    Empty,
    Previewed(Preview),
    Committed(Preview),
}

/// ReconciliationSession previews one payload against a repository and
/// then commits decisions for it.
///
/// Preview never writes. Commit processes every decision and accounts for
/// each one; a failing write is recorded and the next decision proceeds.
pub struct ReconciliationSession<R: ContentRepository> {
    repository: R,
    stage: Stage,
}

impl<R: ContentRepository> ReconciliationSession<R> {
    /// Creates a new session over `repository`.
    pub fn new(repository: R) -> Self {
        ReconciliationSession {
            repository,
            stage: Stage::Empty,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.stage {
            Stage::Empty => SessionState::Empty,
            Stage::Previewed(_) => SessionState::Previewed,
            Stage::Committed(_) => SessionState::Committed,
        }
    }

    /// The last preview, if one was taken.
    pub fn current_preview(&self) -> Option<&Preview> {
        match &self.stage {
            Stage::Empty => None,
            Stage::Previewed(preview) | Stage::Committed(preview) => Some(preview),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// Compares every payload item with its stored counterpart.
    ///
    /// Items with an invalid or duplicate identity, or whose lookup fails,
    /// are listed in [`Preview::rejected`]. Taking a new preview before
    /// committing replaces the previous one.
    pub fn preview(&mut self, payload: &ExportPayload) -> Result<&Preview> {
        if let Stage::Committed(_) = self.stage {
            return Err(SyncError::session("session already committed"));
        }
        info!(kind = %payload.kind, items = payload.items.len(), "previewing payload");

        let mut preview = Preview::new(payload.kind);
        let mut seen: HashSet<IdentityKey> = HashSet::new();

        for (position, item) in payload.items.iter().enumerate() {
            let identity = match item.identity() {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(position, error = %e, "rejecting item with invalid identity");
                    preview
                        .rejected
                        .push(ItemError::new(format!("#{}", position), e.to_string()));
                    continue;
                }
            };
            let key = identity.to_string();

            if !seen.insert(identity.clone()) {
                warn!(key = %key, "rejecting duplicate item");
                preview
                    .rejected
                    .push(ItemError::new(key, "duplicate identity in payload"));
                continue;
            }

            let current = match self.repository.find_current(&identity) {
                Ok(current) => current,
                Err(e) => {
                    warn!(key = %key, error = %e, "lookup failed");
                    preview.rejected.push(ItemError::new(key, e.to_string()));
                    continue;
                }
            };

            let diffs = diff(current.as_ref().map(ContentItem::body), item.body());
            if diffs.is_empty() {
                debug!(key = %key, "unchanged");
                preview.unchanged += 1;
                continue;
            }

            let status = summarize(&diffs);
            debug!(key = %key, status = %status, paths = diffs.len(), "surfaced");
            preview.push(DiffEntry {
                key,
                identity,
                status,
                diffs,
                current,
                incoming: item.clone(),
            });
        }

        info!(
            kind = %payload.kind,
            surfaced = preview.len(),
            unchanged = preview.unchanged,
            rejected = preview.rejected.len(),
            "preview ready"
        );

        self.stage = Stage::Previewed(preview);
        match &self.stage {
            Stage::Previewed(preview) => Ok(preview),
            _ => Err(SyncError::session("preview was not recorded")),
        }
    }

    /// Applies `plan` to the previewed entries.
    ///
    /// Fails only on session misuse: no preview, a second commit, or a
    /// `kind` that differs from the previewed payload.
    pub fn commit(&mut self, kind: ContentKind, plan: CommitPlan) -> Result<ReconciliationResult> {
        let preview = match &self.stage {
            Stage::Previewed(preview) => preview,
            Stage::Empty => return Err(SyncError::session("commit called before preview")),
            Stage::Committed(_) => return Err(SyncError::session("session already committed")),
        };
        if preview.kind != kind {
            return Err(SyncError::session(format!(
                "commit for {} does not match previewed {}",
                kind, preview.kind
            )));
        }

        let decisions = match plan {
            CommitPlan::Decisions(decisions) => decisions,
            CommitPlan::Auto(action) => preview
                .entries()
                .map(|entry| Decision::new(entry.key.clone(), action))
                .collect(),
        };
        info!(kind = %kind, decisions = decisions.len(), "committing");

        let mut result = ReconciliationResult::new();
        let mut decided: HashSet<&str> = HashSet::new();
        for decision in &decisions {
            let outcome = apply(&mut self.repository, preview, decision, &mut decided);
            result.absorb(outcome);
        }

        info!(
            created = result.created,
            updated = result.updated,
            skipped = result.skipped,
            errors = result.errors.len(),
            "commit finished"
        );

        if let Stage::Previewed(preview) = std::mem::replace(&mut self.stage, Stage::Empty) {
            self.stage = Stage::Committed(preview);
        }
        Ok(result)
    }
}

fn apply<'a, R: ContentRepository>(
    repository: &mut R,
    preview: &Preview,
    decision: &'a Decision,
    decided: &mut HashSet<&'a str>,
) -> ReconciliationResult {
    let entry = match preview.entry(&decision.key) {
        Some(entry) => entry,
        None => {
            warn!(key = %decision.key, "skipping decision for unknown key");
            return ReconciliationResult::skipped();
        }
    };
    if !decided.insert(decision.key.as_str()) {
        warn!(key = %decision.key, "skipping repeated decision");
        return ReconciliationResult::skipped();
    }

    let resolved = match merge_item(entry.current.as_ref(), &entry.incoming, decision.action) {
        Some(resolved) => resolved,
        None => {
            debug!(key = %entry.key, "nothing stored to keep");
            return ReconciliationResult::skipped();
        }
    };

    match &entry.current {
        Some(current) => {
            if canonicalize_map(current.body()) == canonicalize_map(resolved.body()) {
                debug!(key = %entry.key, action = %decision.action, "resolved to stored body");
                return ReconciliationResult::skipped();
            }
            match repository.update(&entry.identity, &resolved) {
                Ok(()) => {
                    debug!(key = %entry.key, action = %decision.action, "updated");
                    ReconciliationResult::updated()
                }
                Err(e) => {
                    warn!(key = %entry.key, error = %e, "update failed");
                    ReconciliationResult::failed(entry.key.as_str(), e.to_string())
                }
            }
        }
        None => match repository.create(&resolved) {
            Ok(created) => {
                debug!(key = %created, action = %decision.action, "created");
                ReconciliationResult::created()
            }
            Err(e @ RepositoryError::Unsupported { .. }) => {
                warn!(key = %entry.key, reason = %e, "skipping item the store cannot create");
                ReconciliationResult::skipped()
            }
            Err(e) => {
                warn!(key = %entry.key, error = %e, "create failed");
                ReconciliationResult::failed(entry.key.as_str(), e.to_string())
            }
        },
    }
}
