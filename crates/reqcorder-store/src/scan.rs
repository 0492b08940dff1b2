//! Enumeration: fresh directory walks, sorted newest first.
//!
//! Nothing is cached. Every call walks the tree, stats each artifact, and
//! sorts by descending modification time. Ties (same mtime tick) fall back to
//! descending identifier, which keeps response IDs minted in one tick in
//! creation order.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use reqcorder_types::ArtifactKind;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::fsio::{self, ArtifactEntry};
use crate::layout::{artifact_stem, check_id};
use crate::store::RecordStore;

/// Metadata for one enumerated artifact file.
///
/// Identifiers are filled in as far as the enumeration depth reveals them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    pub template_hash: Option<String>,
    pub request_hash: Option<String>,
    pub response_id: Option<String>,
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl FileInfo {
    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified.into()
    }

    /// The identifier named by the file itself.
    pub fn id(&self) -> &str {
        self.response_id
            .as_deref()
            .or(self.request_hash.as_deref())
            .or(self.template_hash.as_deref())
            .unwrap_or_default()
    }
}

/// Sort most recently modified first, ties by descending identifier.
pub fn sort_newest_first(files: &mut [FileInfo]) {
    files.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.id().cmp(a.id()))
    });
}

impl RecordStore {
    /// Every response in the store. An absent `responses/` root is empty.
    pub fn list_responses(&self) -> StoreResult<Vec<FileInfo>> {
        let root = self.layout().responses_dir();
        if !fsio::root_exists(&root)? {
            return Ok(Vec::new());
        }
        let mut files: Vec<_> = walk_two_levels(&root)?
            .into_iter()
            .map(|(request_hash, entry)| FileInfo {
                template_hash: None,
                request_hash: Some(request_hash),
                response_id: Some(entry.stem),
                path: entry.path,
                modified: entry.modified,
            })
            .collect();
        sort_newest_first(&mut files);
        debug!(count = files.len(), "listed responses");
        Ok(files)
    }

    /// Responses to one request. The request's directory must exist.
    pub fn list_responses_by_request_hash(&self, request_hash: &str) -> StoreResult<Vec<FileInfo>> {
        let mut files = self.responses_under(request_hash, None)?;
        sort_newest_first(&mut files);
        debug!(%request_hash, count = files.len(), "listed responses by request");
        Ok(files)
    }

    /// Responses to every request derived from one template.
    ///
    /// Two-level scan: the template's request files, then each request's
    /// response directory. Any failure aborts the whole listing.
    pub fn list_responses_by_template_hash(&self, template_hash: &str) -> StoreResult<Vec<FileInfo>> {
        check_id(ArtifactKind::Template, template_hash)?;
        let dir = self.layout().template_requests_dir(template_hash);
        fsio::ensure_dir(&dir)?;

        let mut files = Vec::new();
        for request in fsio::artifact_files(&dir)? {
            files.extend(self.responses_under(&request.stem, Some(template_hash))?);
        }
        sort_newest_first(&mut files);
        debug!(%template_hash, count = files.len(), "listed responses by template");
        Ok(files)
    }

    /// Every request in the store. An absent `requests/` root is empty.
    pub fn list_requests(&self) -> StoreResult<Vec<FileInfo>> {
        let root = self.layout().requests_dir();
        if !fsio::root_exists(&root)? {
            return Ok(Vec::new());
        }
        let mut files: Vec<_> = walk_two_levels(&root)?
            .into_iter()
            .map(|(template_hash, entry)| request_info(template_hash, entry))
            .collect();
        sort_newest_first(&mut files);
        debug!(count = files.len(), "listed requests");
        Ok(files)
    }

    /// Requests derived from one template. The template's directory must exist.
    pub fn list_requests_by_template_hash(&self, template_hash: &str) -> StoreResult<Vec<FileInfo>> {
        check_id(ArtifactKind::Template, template_hash)?;
        let dir = self.layout().template_requests_dir(template_hash);
        fsio::ensure_dir(&dir)?;
        let mut files: Vec<_> = fsio::artifact_files(&dir)?
            .into_iter()
            .map(|entry| request_info(template_hash.to_string(), entry))
            .collect();
        sort_newest_first(&mut files);
        Ok(files)
    }

    /// Every template in the store. An absent `templates/` root is empty.
    pub fn list_templates(&self) -> StoreResult<Vec<FileInfo>> {
        let root = self.layout().templates_dir();
        if !fsio::root_exists(&root)? {
            return Ok(Vec::new());
        }
        let mut files: Vec<_> = fsio::artifact_files(&root)?
            .into_iter()
            .map(|entry| FileInfo {
                template_hash: Some(entry.stem),
                request_hash: None,
                response_id: None,
                path: entry.path,
                modified: entry.modified,
            })
            .collect();
        sort_newest_first(&mut files);
        debug!(count = files.len(), "listed templates");
        Ok(files)
    }

    fn responses_under(&self, request_hash: &str, template_hash: Option<&str>) -> StoreResult<Vec<FileInfo>> {
        check_id(ArtifactKind::Request, request_hash)?;
        let dir = self.layout().request_responses_dir(request_hash);
        fsio::ensure_dir(&dir)?;
        Ok(fsio::artifact_files(&dir)?
            .into_iter()
            .map(|entry| FileInfo {
                template_hash: template_hash.map(str::to_string),
                request_hash: Some(request_hash.to_string()),
                response_id: Some(entry.stem),
                path: entry.path,
                modified: entry.modified,
            })
            .collect())
    }
}

fn request_info(template_hash: String, entry: ArtifactEntry) -> FileInfo {
    FileInfo {
        template_hash: Some(template_hash),
        request_hash: Some(entry.stem),
        response_id: None,
        path: entry.path,
        modified: entry.modified,
    }
}

/// Artifact files exactly two levels below `root`, paired with the name of
/// the directory holding them.
fn walk_two_levels(root: &Path) -> StoreResult<Vec<(String, ArtifactEntry)>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).min_depth(2).max_depth(2).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(stem) = entry.file_name().to_str().and_then(artifact_stem) else {
            continue;
        };
        let Some(parent) = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
        else {
            continue;
        };
        let meta = entry.metadata().map_err(|e| StoreError::PathStat {
            path: entry.path().to_path_buf(),
            source: into_io(e),
        })?;
        let modified = fsio::modified(entry.path(), &meta)?;
        out.push((
            parent.to_string(),
            ArtifactEntry {
                stem: stem.to_string(),
                path: entry.path().to_path_buf(),
                modified,
            },
        ));
    }
    Ok(out)
}

fn walk_error(root: &Path, err: walkdir::Error) -> StoreError {
    let path = err.path().unwrap_or(root).to_path_buf();
    StoreError::DirectoryRead {
        path,
        source: into_io(err),
    }
}

fn into_io(err: walkdir::Error) -> io::Error {
    let message = err.to_string();
    err.into_io_error().unwrap_or_else(|| io::Error::other(message))
}
