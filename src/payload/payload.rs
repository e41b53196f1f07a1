//! Export payload document and its JSON codec.

use super::integrity::{signing_input, IntegrityPolicy, IntegrityTag, Signer};
use crate::content::{ContentItem, ContentKind};
use crate::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::debug;

/// ExportPayload is the portable document written by export and read by
/// import preview. It is not modified after it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPayload {
    pub exported_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub handles: Vec<String>,
    pub sites: Vec<String>,
    pub since: Option<DateTime<Utc>>,
    pub items: Vec<ContentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<IntegrityTag>,
}

/// Top-level shape before any typed interpretation. Items stay raw so the
/// integrity tag is checked against exactly what was read.
#[derive(Deserialize)]
struct RawPayload {
    exported_at: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    handles: Vec<String>,
    #[serde(default)]
    sites: Vec<String>,
    #[serde(default)]
    since: Option<String>,
    items: Vec<Box<RawValue>>,
    #[serde(default)]
    integrity: Option<IntegrityTag>,
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| SyncError::malformed(format!("field `{}` is not RFC 3339: {}", field, e)))
}

impl ExportPayload {
    /// Creates an unsigned payload stamped with the current time.
    pub fn new(kind: ContentKind, items: Vec<ContentItem>) -> Self {
        ExportPayload {
            exported_at: Utc::now(),
            kind,
            handles: Vec::new(),
            sites: Vec::new(),
            since: None,
            items,
            integrity: None,
        }
    }

    /// The canonical bytes covered by the integrity tag.
    pub fn signing_input(&self) -> Result<Vec<u8>> {
        Ok(signing_input(
            self.kind.as_str(),
            &self.handles,
            &self.sites,
            &self.since,
            &self.items,
        )?)
    }

    /// Computes and attaches the integrity tag.
    pub fn sign(&mut self, signer: &Signer) -> Result<()> {
        let input = self.signing_input()?;
        self.integrity = Some(signer.sign(&input));
        Ok(())
    }

    /// Decodes a payload, checking its integrity tag against `policy`.
    ///
    /// Structural problems are [`SyncError::MalformedPayload`]; a bad or
    /// missing-but-required tag is [`SyncError::IntegrityMismatch`]. Items
    /// with blank identity fields still decode; they are rejected per item
    /// during preview.
    pub fn from_json(json: &str, policy: &IntegrityPolicy) -> Result<Self> {
        let raw: RawPayload =
            serde_json::from_str(json).map_err(|e| SyncError::malformed(e.to_string()))?;

        let kind: ContentKind = raw
            .kind
            .parse()
            .map_err(|e: crate::content::UnknownKind| SyncError::malformed(e.to_string()))?;

        let input = signing_input(&raw.kind, &raw.handles, &raw.sites, &raw.since, &raw.items)
            .map_err(|e| SyncError::malformed(e.to_string()))?;
        policy.check(raw.integrity.as_ref(), &input)?;

        let exported_at = parse_timestamp("exported_at", &raw.exported_at)?;
        let since = match raw.since.as_deref() {
            Some(s) if !s.is_empty() => Some(parse_timestamp("since", s)?),
            _ => None,
        };

        let items = raw
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                ContentItem::from_json(kind, item.get())
                    .map_err(|e| SyncError::malformed(format!("item {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(kind = %kind, items = items.len(), signed = raw.integrity.is_some(), "decoded payload");

        Ok(ExportPayload {
            exported_at,
            kind,
            handles: raw.handles,
            sites: raw.sites,
            since,
            items,
            integrity: raw.integrity,
        })
    }

    /// Encodes the payload as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Term;
    use crate::value::map_from_json;
    use pretty_assertions::assert_eq;

    fn term(slug: &str) -> ContentItem {
        ContentItem::Term(Term {
            taxonomy: "tags".into(),
            site: "en".into(),
            slug: slug.into(),
            data: map_from_json(r#"{"title":"T","weight":1.5}"#).unwrap(),
            updated_at: None,
        })
    }

    #[test]
    fn test_roundtrip_unsigned() {
        let payload = ExportPayload::new(ContentKind::Taxonomies, vec![term("a"), term("b")]);
        let json = payload.to_json(true).unwrap();
        let decoded = ExportPayload::from_json(&json, &IntegrityPolicy::none()).unwrap();
        assert_eq!(decoded.items, payload.items);
        assert_eq!(decoded.kind, ContentKind::Taxonomies);
    }

    #[test]
    fn test_signed_payload_verifies() {
        let signer = Signer::new("k");
        let mut payload = ExportPayload::new(ContentKind::Taxonomies, vec![term("a")]);
        payload.handles = vec!["tags".into()];
        payload.since = Some(Utc::now());
        payload.sign(&signer).unwrap();

        let json = payload.to_json(true).unwrap();
        let policy = IntegrityPolicy::with_signer(signer);
        let decoded = ExportPayload::from_json(&json, &policy).unwrap();
        assert_eq!(decoded.integrity, payload.integrity);
    }

    #[test]
    fn test_tampered_item_is_integrity_mismatch() {
        let signer = Signer::new("k");
        let mut payload = ExportPayload::new(ContentKind::Taxonomies, vec![term("a")]);
        payload.sign(&signer).unwrap();

        let json = payload.to_json(false).unwrap().replace(r#""title":"T""#, r#""title":"X""#);
        let err = ExportPayload::from_json(&json, &IntegrityPolicy::with_signer(signer)).unwrap_err();
        assert!(matches!(err, SyncError::IntegrityMismatch { .. }));
    }

    #[test]
    fn test_tampered_large_integer_is_integrity_mismatch() {
        let signer = Signer::new("k");
        let mut item = term("a");
        if let ContentItem::Term(term) = &mut item {
            term.data.set("n", u64::MAX);
        }
        let mut payload = ExportPayload::new(ContentKind::Taxonomies, vec![item]);
        payload.sign(&signer).unwrap();

        let json = payload.to_json(false).unwrap();
        assert!(json.contains("18446744073709551615"));
        let json = json.replace("18446744073709551615", "18446744073709551614");
        let err = ExportPayload::from_json(&json, &IntegrityPolicy::with_signer(signer)).unwrap_err();
        assert!(matches!(err, SyncError::IntegrityMismatch { .. }));
    }

    #[test]
    fn test_out_of_range_number_is_malformed() {
        let err = ExportPayload::from_json(
            r#"{"exported_at":"2024-01-01T00:00:00Z","type":"globals","items":[{"handle":"footer","site":"en","data":{"n":1e400}}]}"#,
            &IntegrityPolicy::none(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::MalformedPayload { .. }));
    }

    #[test]
    fn test_reordered_keys_still_verify() {
        let signer = Signer::new("k");
        let mut payload = ExportPayload::new(ContentKind::Taxonomies, vec![term("a")]);
        payload.sign(&signer).unwrap();

        let json = payload
            .to_json(false)
            .unwrap()
            .replace(r#""title":"T","weight":1.5"#, r#""weight":1.5,"title":"T""#);
        assert!(ExportPayload::from_json(&json, &IntegrityPolicy::with_signer(signer)).is_ok());
    }

    #[test]
    fn test_missing_type_is_malformed() {
        let err = ExportPayload::from_json(
            r#"{"exported_at":"2024-01-01T00:00:00Z","items":[]}"#,
            &IntegrityPolicy::none(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::MalformedPayload { .. }));
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let err = ExportPayload::from_json(
            r#"{"exported_at":"2024-01-01T00:00:00Z","type":"pages","items":[]}"#,
            &IntegrityPolicy::none(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown content type: pages"));
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = ExportPayload::from_json("not json", &IntegrityPolicy::none()).unwrap_err();
        assert!(matches!(err, SyncError::MalformedPayload { .. }));
    }

    #[test]
    fn test_bad_timestamp_is_malformed() {
        let err = ExportPayload::from_json(
            r#"{"exported_at":"yesterday","type":"globals","items":[]}"#,
            &IntegrityPolicy::none(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("exported_at"));
    }

    #[test]
    fn test_null_since_and_missing_lists() {
        let payload = ExportPayload::from_json(
            r#"{"exported_at":"2024-01-01T10:00:00+02:00","type":"globals","since":null,"items":[{"handle":"footer","site":"en","data":{}}]}"#,
            &IntegrityPolicy::none(),
        )
        .unwrap();
        assert_eq!(payload.since, None);
        assert!(payload.handles.is_empty());
        assert_eq!(payload.items.len(), 1);
        assert_eq!(payload.exported_at.to_rfc3339(), "2024-01-01T08:00:00+00:00");
    }
}
