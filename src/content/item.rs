//! Content kinds and the records carried in export payloads.

use super::identity::{IdentityError, IdentityKey};
use crate::value::Map;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ContentKind is the `type` tag of an export payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Collections,
    Taxonomies,
    Navigation,
    Globals,
    Assets,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Collections,
        ContentKind::Taxonomies,
        ContentKind::Navigation,
        ContentKind::Globals,
        ContentKind::Assets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Collections => "collections",
            ContentKind::Taxonomies => "taxonomies",
            ContentKind::Navigation => "navigation",
            ContentKind::Globals => "globals",
            ContentKind::Assets => "assets",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown kind tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content type: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

fn default_published() -> bool {
    true
}

/// A collection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub data: Map,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub taxonomy: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub data: Map,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One site's tree of a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavTree {
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub tree: Map,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One site's localization of a global set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalLocalization {
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub data: Map,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Metadata of an asset. Binaries are never exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMeta {
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub data: Map,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// ContentItem is one record of any kind.
///
/// Serialized untagged: the kind is carried once by the payload's `type`
/// field, not by each item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContentItem {
    Entry(Entry),
    Term(Term),
    NavTree(NavTree),
    Global(GlobalLocalization),
    Asset(AssetMeta),
}

impl ContentItem {
    /// Decodes one item record of the given kind from JSON.
    pub fn from_json(kind: ContentKind, json: &str) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ContentKind::Collections => ContentItem::Entry(serde_json::from_str(json)?),
            ContentKind::Taxonomies => ContentItem::Term(serde_json::from_str(json)?),
            ContentKind::Navigation => ContentItem::NavTree(serde_json::from_str(json)?),
            ContentKind::Globals => ContentItem::Global(serde_json::from_str(json)?),
            ContentKind::Assets => ContentItem::Asset(serde_json::from_str(json)?),
        })
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Entry(_) => ContentKind::Collections,
            ContentItem::Term(_) => ContentKind::Taxonomies,
            ContentItem::NavTree(_) => ContentKind::Navigation,
            ContentItem::Global(_) => ContentKind::Globals,
            ContentItem::Asset(_) => ContentKind::Assets,
        }
    }

    /// Derives the identity key, rejecting blank components.
    pub fn identity(&self) -> Result<IdentityKey, IdentityError> {
        match self {
            ContentItem::Entry(e) => IdentityKey::entry(&e.collection, &e.site, &e.slug),
            ContentItem::Term(t) => IdentityKey::term(&t.taxonomy, &t.site, &t.slug),
            ContentItem::NavTree(n) => IdentityKey::nav_tree(&n.handle, &n.site),
            ContentItem::Global(g) => IdentityKey::global(&g.handle, &g.site),
            ContentItem::Asset(a) => IdentityKey::asset(&a.container, &a.path),
        }
    }

    /// The diffable tree: `tree` for navigation, `data` otherwise.
    pub fn body(&self) -> &Map {
        match self {
            ContentItem::Entry(e) => &e.data,
            ContentItem::Term(t) => &t.data,
            ContentItem::NavTree(n) => &n.tree,
            ContentItem::Global(g) => &g.data,
            ContentItem::Asset(a) => &a.data,
        }
    }

    /// Returns a copy of this item with its body replaced.
    pub fn with_body(&self, body: Map) -> ContentItem {
        let mut item = self.clone();
        match &mut item {
            ContentItem::Entry(e) => e.data = body,
            ContentItem::Term(t) => t.data = body,
            ContentItem::NavTree(n) => n.tree = body,
            ContentItem::Global(g) => g.data = body,
            ContentItem::Asset(a) => a.data = body,
        }
        item
    }

    /// The handle the export `handles` filter matches against.
    pub fn container(&self) -> &str {
        match self {
            ContentItem::Entry(e) => &e.collection,
            ContentItem::Term(t) => &t.taxonomy,
            ContentItem::NavTree(n) => &n.handle,
            ContentItem::Global(g) => &g.handle,
            ContentItem::Asset(a) => &a.container,
        }
    }

    /// The site handle, if this kind is localized.
    pub fn site(&self) -> Option<&str> {
        match self {
            ContentItem::Entry(e) => Some(&e.site),
            ContentItem::Term(t) => Some(&t.site),
            ContentItem::NavTree(n) => Some(&n.site),
            ContentItem::Global(g) => Some(&g.site),
            ContentItem::Asset(_) => None,
        }
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ContentItem::Entry(e) => e.updated_at,
            ContentItem::Term(t) => t.updated_at,
            ContentItem::NavTree(n) => n.updated_at,
            ContentItem::Global(g) => g.updated_at,
            ContentItem::Asset(a) => a.updated_at,
        }
    }
}

impl From<Entry> for ContentItem {
    fn from(e: Entry) -> Self {
        ContentItem::Entry(e)
    }
}

impl From<Term> for ContentItem {
    fn from(t: Term) -> Self {
        ContentItem::Term(t)
    }
}

impl From<NavTree> for ContentItem {
    fn from(n: NavTree) -> Self {
        ContentItem::NavTree(n)
    }
}

impl From<GlobalLocalization> for ContentItem {
    fn from(g: GlobalLocalization) -> Self {
        ContentItem::Global(g)
    }
}

impl From<AssetMeta> for ContentItem {
    fn from(a: AssetMeta) -> Self {
        ContentItem::Asset(a)
    }
}
