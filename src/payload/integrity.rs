//! HMAC-SHA256 integrity tags over the canonical payload content.

use crate::error::{Result, SyncError};
use crate::value::canonical_json;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// The only supported `algo` value.
pub const HMAC_SHA256: &str = "hmac-sha256";

/// IntegrityTag is the optional `integrity` object of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityTag {
    /// Hex-encoded MAC.
    pub sig: String,
    pub algo: String,
}

/// The fields covered by the tag. Every other top-level field, including
/// `exported_at`, is outside the signature.
#[derive(Serialize)]
struct SignedFields<'a, S: Serialize, I: Serialize> {
    #[serde(rename = "type")]
    kind: &'a str,
    handles: &'a [String],
    sites: &'a [String],
    since: &'a Option<S>,
    items: &'a [I],
}

/// Builds the canonical byte string a tag is computed over.
///
/// Generic over the representation of `since` and of the items so the
/// exporter can sign typed items while the importer verifies the raw ones
/// it read from disk; both canonicalize to the same bytes.
pub fn signing_input<S: Serialize, I: Serialize>(
    kind: &str,
    handles: &[String],
    sites: &[String],
    since: &Option<S>,
    items: &[I],
) -> std::result::Result<Vec<u8>, serde_json::Error> {
    canonical_json(&SignedFields {
        kind,
        handles,
        sites,
        since,
        items,
    })
}

/// Signer holds the shared key used to tag and verify payloads.
#[derive(Clone)]
pub struct Signer {
    key: Vec<u8>,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("key", &"<redacted>").finish()
    }
}

impl Signer {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Signer {
            key: key.as_ref().to_vec(),
        }
    }

    fn mac(&self, message: &[u8]) -> Vec<u8> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key)
            .expect("HMAC can take key of any size");
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }

    /// Computes the tag for `message`.
    pub fn sign(&self, message: &[u8]) -> IntegrityTag {
        IntegrityTag {
            sig: hex::encode(self.mac(message)),
            algo: HMAC_SHA256.to_string(),
        }
    }

    /// Recomputes the tag for `message` and compares it in constant time.
    pub fn verify(&self, tag: &IntegrityTag, message: &[u8]) -> Result<()> {
        if tag.algo != HMAC_SHA256 {
            return Err(SyncError::integrity(format!(
                "unsupported algorithm '{}'",
                tag.algo
            )));
        }
        let expected = hex::decode(&tag.sig)
            .map_err(|_| SyncError::integrity("signature is not valid hex"))?;
        let computed = self.mac(message);
        if bool::from(expected.ct_eq(&computed)) {
            Ok(())
        } else {
            Err(SyncError::integrity("signature does not match payload content"))
        }
    }
}

/// IntegrityPolicy decides how an importer treats the `integrity` field.
#[derive(Debug, Clone, Default)]
pub struct IntegrityPolicy {
    pub signer: Option<Signer>,
    /// Reject payloads that carry no tag.
    pub require_signature: bool,
}

impl IntegrityPolicy {
    /// Accepts unsigned payloads and rejects signed ones, since they
    /// cannot be verified without a key.
    pub fn none() -> Self {
        IntegrityPolicy::default()
    }

    pub fn with_signer(signer: Signer) -> Self {
        IntegrityPolicy {
            signer: Some(signer),
            require_signature: false,
        }
    }

    pub fn require(mut self, require: bool) -> Self {
        self.require_signature = require;
        self
    }

    /// Checks `tag` against `message` according to this policy.
    pub fn check(&self, tag: Option<&IntegrityTag>, message: &[u8]) -> Result<()> {
        match (tag, &self.signer) {
            (Some(tag), Some(signer)) => signer.verify(tag, message),
            (Some(_), None) => Err(SyncError::integrity(
                "payload is signed but no signing key is configured",
            )),
            (None, _) if self.require_signature => {
                Err(SyncError::integrity("payload is not signed"))
            }
            (None, _) => Ok(()),
        }
    }
}
