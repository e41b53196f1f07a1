//! In-memory content store with a JSON snapshot format.

use super::{ContentRepository, ContentSource, ExportFilter, RepositoryError};
use crate::content::{ContentItem, ContentKind, IdentityKey};
use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// MemoryStore keeps every record in a map keyed by identity.
///
/// Snapshots are a JSON list of `{"type": <kind>, "item": <record>}`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<IdentityKey, ContentItem>,
}

#[derive(Serialize)]
struct SnapshotRecordOut<'a> {
    #[serde(rename = "type")]
    kind: ContentKind,
    item: &'a ContentItem,
}

#[derive(Deserialize)]
struct SnapshotRecordIn {
    #[serde(rename = "type")]
    kind: ContentKind,
    item: Box<RawValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Inserts or replaces a record, keyed by its own identity.
    pub fn insert(&mut self, item: ContentItem) -> std::result::Result<IdentityKey, RepositoryError> {
        let key = item
            .identity()
            .map_err(|e| RepositoryError::backend(e.to_string()))?;
        self.items.insert(key.clone(), item);
        Ok(key)
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&ContentItem> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, &ContentItem)> {
        self.items.iter()
    }

    /// Decodes a snapshot document.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<SnapshotRecordIn> = serde_json::from_str(json)
            .map_err(|e| SyncError::config(format!("invalid store snapshot: {}", e)))?;

        let mut store = MemoryStore::new();
        for (i, record) in records.into_iter().enumerate() {
            let item = ContentItem::from_json(record.kind, record.item.get()).map_err(|e| {
                SyncError::config(format!("invalid store snapshot record {}: {}", i, e))
            })?;
            store.insert(item)?;
        }
        Ok(store)
    }

    /// Encodes the store as a snapshot document.
    pub fn to_json(&self) -> Result<String> {
        let records: Vec<SnapshotRecordOut<'_>> = self
            .items
            .values()
            .map(|item| SnapshotRecordOut {
                kind: item.kind(),
                item,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Loads a snapshot file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "store snapshot missing, starting empty");
            return Ok(MemoryStore::new());
        }
        let json = fs::read_to_string(path).map_err(|e| SyncError::io("read", path, e))?;
        MemoryStore::from_json(&json)
    }

    /// Writes the store to a snapshot file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| SyncError::io("write", path, e))
    }
}

impl ContentRepository for MemoryStore {
    fn find_current(&self, key: &IdentityKey) -> std::result::Result<Option<ContentItem>, RepositoryError> {
        Ok(self.items.get(key).cloned())
    }

    fn create(&mut self, item: &ContentItem) -> std::result::Result<IdentityKey, RepositoryError> {
        let key = item
            .identity()
            .map_err(|e| RepositoryError::backend(e.to_string()))?;
        if self.items.contains_key(&key) {
            return Err(RepositoryError::already_exists(&key));
        }
        if let IdentityKey::Asset { .. } = key {
            return Err(RepositoryError::unsupported(
                &key,
                "asset metadata can only be attached to an existing file",
            ));
        }
        self.items.insert(key.clone(), item.clone());
        Ok(key)
    }

    fn update(&mut self, key: &IdentityKey, item: &ContentItem) -> std::result::Result<(), RepositoryError> {
        match self.items.get_mut(key) {
            Some(slot) => {
                *slot = item.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found(key)),
        }
    }
}

impl ContentSource for MemoryStore {
    fn list(
        &self,
        kind: ContentKind,
        filter: &ExportFilter,
    ) -> std::result::Result<Vec<ContentItem>, RepositoryError> {
        Ok(self
            .items
            .values()
            .filter(|item| item.kind() == kind && filter.matches(item))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AssetMeta, GlobalLocalization};
    use crate::value::map_from_json;
    use pretty_assertions::assert_eq;

    fn global(handle: &str, site: &str, data: &str) -> ContentItem {
        ContentItem::Global(GlobalLocalization {
            handle: handle.into(),
            site: site.into(),
            data: map_from_json(data).unwrap(),
            updated_at: None,
        })
    }

    #[test]
    fn test_create_then_find() {
        let mut store = MemoryStore::new();
        let item = global("footer", "en", r#"{"copy":"(c)"}"#);
        let key = store.create(&item).unwrap();

        assert_eq!(store.find_current(&key).unwrap(), Some(item.clone()));
        assert_eq!(
            store.create(&item).unwrap_err(),
            RepositoryError::already_exists(&key)
        );
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut store = MemoryStore::new();
        let item = global("footer", "en", "{}");
        let key = item.identity().unwrap();
        assert_eq!(
            store.update(&key, &item).unwrap_err(),
            RepositoryError::not_found(&key)
        );
    }

    #[test]
    fn test_asset_create_is_unsupported() {
        let mut store = MemoryStore::new();
        let asset = ContentItem::Asset(AssetMeta {
            container: "assets".into(),
            path: "a.jpg".into(),
            data: Default::default(),
            updated_at: None,
        });
        assert!(matches!(
            store.create(&asset),
            Err(RepositoryError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_list_filters_by_kind_and_handle() {
        let mut store = MemoryStore::new();
        store.insert(global("footer", "en", "{}")).unwrap();
        store.insert(global("header", "en", "{}")).unwrap();

        let all = store.list(ContentKind::Globals, &ExportFilter::new()).unwrap();
        assert_eq!(all.len(), 2);

        let footer = store
            .list(ContentKind::Globals, &ExportFilter::new().handles(["footer"]))
            .unwrap();
        assert_eq!(footer, vec![global("footer", "en", "{}")]);

        assert!(store
            .list(ContentKind::Collections, &ExportFilter::new())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_snapshot_roundtrip_through_file() {
        let mut store = MemoryStore::new();
        store.insert(global("footer", "en", r#"{"b":1,"a":2}"#)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        store.save(&path).unwrap();

        let loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        let key = IdentityKey::global("footer", "en").unwrap();
        assert_eq!(loaded.get(&key), store.get(&key));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load(&dir.path().join("none.json")).unwrap();
        assert!(store.is_empty());
    }
}
