//! Sync configuration: a YAML file plus environment overrides.

use crate::error::{Result, SyncError};
use crate::merge::Action;
use crate::payload::{IntegrityPolicy, PayloadReader, PayloadWriter, Signer};
use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_FOLDER: &str = "CONTENT_SYNC_FOLDER";
pub const ENV_SIGNING_KEY: &str = "CONTENT_SYNC_SIGNING_KEY";
pub const ENV_REQUIRE_SIGNATURE: &str = "CONTENT_SYNC_REQUIRE_SIGNATURE";

fn default_folder() -> PathBuf {
    PathBuf::from("sync")
}

fn default_pretty() -> bool {
    true
}

/// SyncConfig controls where payloads live and how they are signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Folder export writes to and import resolves bare names against.
    #[serde(default = "default_folder")]
    pub folder: PathBuf,

    /// Shared HMAC key. Exports are signed and signed imports verified
    /// only when set.
    #[serde(default)]
    pub signing_key: Option<String>,

    /// Reject unsigned payloads on import.
    #[serde(default)]
    pub require_signature: bool,

    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// Action applied by `import` when none is given.
    #[serde(default)]
    pub default_action: Option<Action>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            folder: default_folder(),
            signing_key: None,
            require_signature: false,
            pretty: default_pretty(),
            default_action: None,
        }
    }
}

impl SyncConfig {
    /// Parses a YAML document. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(SyncConfig::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| SyncError::config(e.to_string()))
    }

    /// Reads `path` if given, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let yaml =
                    fs::read_to_string(path).map_err(|e| SyncError::io("read", path, e))?;
                SyncConfig::from_yaml(&yaml)?
            }
            None => SyncConfig::default(),
        };
        config.with_overrides(|key| std::env::var(key))
    }

    /// Applies overrides from a variable reader.
    pub fn with_overrides<F>(mut self, reader: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        if let Ok(folder) = reader(ENV_FOLDER) {
            if !folder.is_empty() {
                self.folder = PathBuf::from(folder);
            }
        }
        if let Ok(key) = reader(ENV_SIGNING_KEY) {
            self.signing_key = if key.is_empty() { None } else { Some(key) };
        }
        if let Ok(raw) = reader(ENV_REQUIRE_SIGNATURE) {
            self.require_signature = parse_flag(&raw).ok_or_else(|| {
                SyncError::config(format!("invalid value for {}: {}", ENV_REQUIRE_SIGNATURE, raw))
            })?;
        }
        Ok(self)
    }

    pub fn signer(&self) -> Option<Signer> {
        self.signing_key.as_deref().map(Signer::new)
    }

    pub fn integrity_policy(&self) -> IntegrityPolicy {
        let policy = match self.signer() {
            Some(signer) => IntegrityPolicy::with_signer(signer),
            None => IntegrityPolicy::none(),
        };
        policy.require(self.require_signature)
    }

    pub fn reader(&self) -> PayloadReader {
        PayloadReader::new(&self.folder, self.integrity_policy())
    }

    pub fn writer(&self) -> PayloadWriter {
        PayloadWriter::new(&self.folder).pretty(self.pretty)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
