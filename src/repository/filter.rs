//! Export selection filter.

use crate::content::ContentItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ExportFilter selects which items an export includes.
///
/// Empty `handles` or `sites` select everything. `sites` is ignored for
/// kinds without a site axis. When `since` is set, items without an
/// `updated_at` stamp are excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFilter {
    #[serde(default)]
    pub handles: Vec<String>,
    #[serde(default)]
    pub sites: Vec<String>,
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

fn clean_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(|v| v.into().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl ExportFilter {
    pub fn new() -> Self {
        ExportFilter::default()
    }

    /// Sets the handle list. Parts are trimmed and blank ones dropped.
    pub fn handles<I, S>(mut self, handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handles = clean_list(handles);
        self
    }

    pub fn sites<I, S>(mut self, sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sites = clean_list(sites);
        self
    }

    pub fn since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self
    }

    /// Returns true if `item` passes every configured criterion.
    pub fn matches(&self, item: &ContentItem) -> bool {
        if !self.handles.is_empty() && !self.handles.iter().any(|h| h == item.container()) {
            return false;
        }
        if let Some(site) = item.site() {
            if !self.sites.is_empty() && !self.sites.iter().any(|s| s == site) {
                return false;
            }
        }
        match (self.since, item.updated_at()) {
            (Some(since), Some(at)) => at >= since,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}
