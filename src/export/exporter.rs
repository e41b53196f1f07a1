//! Builds export payloads from a content source.

use crate::content::ContentKind;
use crate::error::Result;
use crate::payload::{ExportPayload, PayloadWriter, Signer, WrittenExport};
use crate::repository::{ContentSource, ExportFilter};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info};

/// ExportRequest describes one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub kind: ContentKind,
    pub filter: ExportFilter,
    /// Custom file name; only its base name is used.
    pub out: Option<String>,
}

impl ExportRequest {
    pub fn new(kind: ContentKind) -> Self {
        ExportRequest {
            kind,
            filter: ExportFilter::new(),
            out: None,
        }
    }

    pub fn filter(mut self, filter: ExportFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn out(mut self, out: impl Into<String>) -> Self {
        self.out = Some(out.into());
        self
    }

    /// The file name to write: the custom name's base name, or
    /// `{type}-export-{YYYYmmdd-HHMMSS}.json` stamped with `at`.
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        let custom = self
            .out
            .as_deref()
            .and_then(|out| Path::new(out).file_name())
            .and_then(|name| name.to_str());
        match custom {
            Some(name) => name.to_string(),
            None => format!("{}-export-{}.json", self.kind, at.format("%Y%m%d-%H%M%S")),
        }
    }
}

/// Exporter turns a content source into signed or unsigned payloads.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    signer: Option<Signer>,
}

impl Exporter {
    pub fn new() -> Self {
        Exporter::default()
    }

    pub fn with_signer(signer: Option<Signer>) -> Self {
        Exporter { signer }
    }

    /// Lists the selected items and wraps them in a payload.
    pub fn export<S: ContentSource + ?Sized>(
        &self,
        source: &S,
        request: &ExportRequest,
    ) -> Result<ExportPayload> {
        let items = source.list(request.kind, &request.filter)?;
        debug!(kind = %request.kind, count = items.len(), "listed items for export");

        let mut payload = ExportPayload::new(request.kind, items);
        payload.handles = request.filter.handles.clone();
        payload.sites = request.filter.sites.clone();
        payload.since = request.filter.since;

        if let Some(signer) = &self.signer {
            payload.sign(signer)?;
        }
        Ok(payload)
    }

    /// Exports and writes the payload with `writer`.
    pub fn export_to<S: ContentSource + ?Sized>(
        &self,
        source: &S,
        request: &ExportRequest,
        writer: &PayloadWriter,
    ) -> Result<WrittenExport> {
        let payload = self.export(source, request)?;
        let file_name = request.file_name(payload.exported_at);
        let written = writer.write(&payload, &file_name)?;
        info!(kind = %request.kind, count = written.count, signed = payload.integrity.is_some(), "export complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentItem, Entry};
    use crate::payload::{IntegrityPolicy, PayloadReader};
    use crate::repository::MemoryStore;
    use crate::value::map_from_json;
    use chrono::TimeZone;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        for (collection, site, slug) in [("blog", "en", "a"), ("blog", "fr", "a"), ("news", "en", "b")] {
            store
                .insert(ContentItem::Entry(Entry {
                    collection: collection.into(),
                    site: site.into(),
                    slug: slug.into(),
                    published: true,
                    data: map_from_json(r#"{"title":"T"}"#).unwrap(),
                    updated_at: None,
                }))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_export_applies_filter_and_echoes_it() {
        let request = ExportRequest::new(ContentKind::Collections)
            .filter(ExportFilter::new().handles(["blog"]).sites(["en"]));
        let payload = Exporter::new().export(&store(), &request).unwrap();

        assert_eq!(payload.items.len(), 1);
        assert_eq!(payload.handles, vec!["blog".to_string()]);
        assert_eq!(payload.sites, vec!["en".to_string()]);
        assert!(payload.integrity.is_none());
    }

    #[test]
    fn test_default_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let request = ExportRequest::new(ContentKind::Globals);
        assert_eq!(request.file_name(at), "globals-export-20240309-140507.json");
        assert_eq!(request.clone().out("sub/dir/mine.json").file_name(at), "mine.json");
    }

    #[test]
    fn test_signed_export_round_trips_through_reader() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::with_signer(Some(Signer::new("shared")));
        let request = ExportRequest::new(ContentKind::Collections).out("all.json");

        let written = exporter
            .export_to(&store(), &request, &PayloadWriter::new(dir.path()))
            .unwrap();
        assert_eq!(written.count, 3);

        let reader = PayloadReader::new(
            dir.path(),
            IntegrityPolicy::with_signer(Signer::new("shared")).require(true),
        );
        let payload = reader.read("all.json").unwrap();
        assert_eq!(payload.items.len(), 3);

        let wrong_key = PayloadReader::new(dir.path(), IntegrityPolicy::with_signer(Signer::new("other")));
        assert!(wrong_key.read("all.json").is_err());
    }
}
