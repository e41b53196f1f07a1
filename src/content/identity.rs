//! Typed identity keys and grouping.

use super::item::ContentKind;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Locale used for kinds that have no site axis.
pub const NO_LOCALE: &str = "-";

/// IdentityKey addresses one content record in both the live store and an
/// export payload.
///
/// Keys are compared structurally. [`Display`](fmt::Display) renders the
/// transport form used in decisions and logs; that form is never parsed
/// back into components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdentityKey {
    Entry {
        collection: String,
        site: String,
        slug: String,
    },
    Term {
        taxonomy: String,
        site: String,
        slug: String,
    },
    NavTree {
        handle: String,
        site: String,
    },
    Global {
        handle: String,
        site: String,
    },
    Asset {
        container: String,
        path: String,
    },
}

/// GroupKey is the `(container, locale)` bucket an item is presented under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub container: String,
    pub locale: String,
}

impl GroupKey {
    pub fn new(container: impl Into<String>, locale: impl Into<String>) -> Self {
        GroupKey {
            container: container.into(),
            locale: locale.into(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.container, self.locale)
    }
}

/// IdentityError reports an item whose identity cannot be derived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("{kind} item is missing required identity field '{field}'")]
    EmptyComponent { kind: ContentKind, field: &'static str },
}

impl IdentityError {
    /// Creates an empty component error.
    pub fn empty_component(kind: ContentKind, field: &'static str) -> Self {
        IdentityError::EmptyComponent { kind, field }
    }
}

impl IdentityKey {
    /// Builds an entry key after checking that no component is blank.
    pub fn entry(collection: &str, site: &str, slug: &str) -> Result<Self, IdentityError> {
        let kind = ContentKind::Collections;
        Ok(IdentityKey::Entry {
            collection: required(kind, "collection", collection)?,
            site: required(kind, "site", site)?,
            slug: required(kind, "slug", slug)?,
        })
    }

    pub fn term(taxonomy: &str, site: &str, slug: &str) -> Result<Self, IdentityError> {
        let kind = ContentKind::Taxonomies;
        Ok(IdentityKey::Term {
            taxonomy: required(kind, "taxonomy", taxonomy)?,
            site: required(kind, "site", site)?,
            slug: required(kind, "slug", slug)?,
        })
    }

    pub fn nav_tree(handle: &str, site: &str) -> Result<Self, IdentityError> {
        let kind = ContentKind::Navigation;
        Ok(IdentityKey::NavTree {
            handle: required(kind, "handle", handle)?,
            site: required(kind, "site", site)?,
        })
    }

    pub fn global(handle: &str, site: &str) -> Result<Self, IdentityError> {
        let kind = ContentKind::Globals;
        Ok(IdentityKey::Global {
            handle: required(kind, "handle", handle)?,
            site: required(kind, "site", site)?,
        })
    }

    pub fn asset(container: &str, path: &str) -> Result<Self, IdentityError> {
        let kind = ContentKind::Assets;
        Ok(IdentityKey::Asset {
            container: required(kind, "container", container)?,
            path: required(kind, "path", path)?,
        })
    }

    /// Returns the content kind this key addresses.
    pub fn kind(&self) -> ContentKind {
        match self {
            IdentityKey::Entry { .. } => ContentKind::Collections,
            IdentityKey::Term { .. } => ContentKind::Taxonomies,
            IdentityKey::NavTree { .. } => ContentKind::Navigation,
            IdentityKey::Global { .. } => ContentKind::Globals,
            IdentityKey::Asset { .. } => ContentKind::Assets,
        }
    }

    /// Returns the `(container, locale)` group of this key.
    pub fn group(&self) -> GroupKey {
        match self {
            IdentityKey::Entry {
                collection, site, ..
            } => GroupKey::new(collection, site),
            IdentityKey::Term { taxonomy, site, .. } => GroupKey::new(taxonomy, site),
            IdentityKey::NavTree { handle, site } | IdentityKey::Global { handle, site } => {
                GroupKey::new(handle, site)
            }
            IdentityKey::Asset { container, .. } => GroupKey::new(container, NO_LOCALE),
        }
    }

    fn components(&self) -> Vec<&str> {
        match self {
            IdentityKey::Entry {
                collection,
                site,
                slug,
            } => vec![collection.as_str(), site.as_str(), slug.as_str()],
            IdentityKey::Term {
                taxonomy,
                site,
                slug,
            } => vec![taxonomy.as_str(), site.as_str(), slug.as_str()],
            IdentityKey::NavTree { handle, site } | IdentityKey::Global { handle, site } => {
                vec![handle.as_str(), site.as_str()]
            }
            IdentityKey::Asset { container, path } => vec![container.as_str(), path.as_str()],
        }
    }
}

fn required(kind: ContentKind, field: &'static str, value: &str) -> Result<String, IdentityError> {
    if value.trim().is_empty() {
        return Err(IdentityError::empty_component(kind, field));
    }
    Ok(value.to_string())
}

/// Escapes `%` and `/` so a component can sit before a delimiter.
fn escape_component(raw: &str, out: &mut String) {
    for ch in raw.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            _ => out.push(ch),
        }
    }
}

impl fmt::Display for IdentityKey {
    /// `collection/site/slug`, `handle/site` or `container/path`.
    ///
    /// Every component but the last is escaped, so the first raw `/` after
    /// each escaped component is always a delimiter. Asset paths and slugs
    /// stay readable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components = self.components();
        let (last, leading) = match components.split_last() {
            Some(split) => split,
            None => return Ok(()),
        };
        let mut out = String::new();
        for component in leading {
            escape_component(component, &mut out);
            out.push('/');
        }
        out.push_str(last);
        f.write_str(&out)
    }
}
