//! Reading and writing payload files under the sync folder.

use super::integrity::IntegrityPolicy;
use super::payload::ExportPayload;
use crate::error::{Result, SyncError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a written export landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenExport {
    pub path: PathBuf,
    pub count: usize,
}

/// PayloadWriter writes payload files into a folder.
#[derive(Debug, Clone)]
pub struct PayloadWriter {
    folder: PathBuf,
    pretty: bool,
}

impl PayloadWriter {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        PayloadWriter {
            folder: folder.into(),
            pretty: true,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Writes `payload` as `<folder>/<file_name>`, creating the folder.
    ///
    /// Only the base name of `file_name` is used, so a caller-supplied
    /// name cannot escape the folder.
    pub fn write(&self, payload: &ExportPayload, file_name: &str) -> Result<WrittenExport> {
        let base = Path::new(file_name)
            .file_name()
            .ok_or_else(|| SyncError::config(format!("invalid export file name '{}'", file_name)))?;

        fs::create_dir_all(&self.folder)
            .map_err(|e| SyncError::io("create folder", &self.folder, e))?;

        let path = self.folder.join(base);
        let json = payload.to_json(self.pretty)?;
        fs::write(&path, json).map_err(|e| SyncError::io("write", &path, e))?;

        info!(path = %path.display(), count = payload.items.len(), kind = %payload.kind, "wrote export");
        Ok(WrittenExport {
            path,
            count: payload.items.len(),
        })
    }
}

/// PayloadReader locates, reads and decodes payload files.
#[derive(Debug, Clone)]
pub struct PayloadReader {
    folder: PathBuf,
    policy: IntegrityPolicy,
}

impl PayloadReader {
    pub fn new(folder: impl Into<PathBuf>, policy: IntegrityPolicy) -> Self {
        PayloadReader {
            folder: folder.into(),
            policy,
        }
    }

    /// Resolves `path_or_name`: an absolute path, then a path relative to
    /// the working directory, then a name inside the sync folder.
    pub fn resolve(&self, path_or_name: &str) -> Result<PathBuf> {
        let direct = PathBuf::from(path_or_name);
        if direct.is_absolute() {
            return if direct.is_file() {
                Ok(direct)
            } else {
                Err(not_found(&direct))
            };
        }
        if direct.is_file() {
            return Ok(direct);
        }
        let in_folder = self.folder.join(path_or_name.trim_start_matches('/'));
        if in_folder.is_file() {
            Ok(in_folder)
        } else {
            Err(not_found(&in_folder))
        }
    }

    /// Reads and decodes a payload file.
    pub fn read(&self, path_or_name: &str) -> Result<ExportPayload> {
        let path = self.resolve(path_or_name)?;
        debug!(path = %path.display(), "reading payload");
        let json = fs::read_to_string(&path).map_err(|e| SyncError::io("read", &path, e))?;
        self.decode(&json)
    }

    /// Decodes payload JSON already in memory, e.g. an upload body.
    pub fn decode(&self, json: &str) -> Result<ExportPayload> {
        ExportPayload::from_json(json, &self.policy)
    }
}

fn not_found(path: &Path) -> SyncError {
    SyncError::io(
        "find import file",
        path,
        std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    )
}
