//! Filesystem primitives shared by the write and read paths.
//!
//! Every failure is mapped onto a [`StoreError`] variant carrying the path.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use reqcorder_types::ArtifactKind;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::layout::artifact_stem;

/// Prefix of in-flight temporary files. Never ends in `.yaml`, so scans skip them.
const TEMP_PREFIX: &str = ".tmp-";

/// An artifact file found while enumerating one directory.
#[derive(Clone, Debug)]
pub(crate) struct ArtifactEntry {
    pub stem: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Require `path` to be an existing directory.
pub(crate) fn ensure_dir(path: &Path) -> StoreResult<()> {
    let meta = fs::metadata(path).map_err(|source| StoreError::PathStat {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(StoreError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Like [`ensure_dir`], but an absent path is reported as `Ok(false)`.
///
/// Used for top-level roots, where "never created" means "no records yet".
pub(crate) fn root_exists(path: &Path) -> StoreResult<bool> {
    match ensure_dir(path) {
        Ok(()) => Ok(true),
        Err(StoreError::PathStat { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "root directory absent, treating as empty");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn create_dir_all(path: &Path) -> StoreResult<()> {
    fs::create_dir_all(path).map_err(|source| StoreError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace `path` with `contents`, creating the parent directory on demand.
///
/// The bytes go to a temporary file in the destination directory which is
/// then renamed over `path`, so readers see either the old or the new file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    create_dir_all(parent)?;

    let write_err = |source: io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)
        .map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "artifact written");
    Ok(())
}

/// Read an artifact, mapping a missing file to [`StoreError::NotFound`].
pub(crate) fn read_artifact(path: &Path, kind: ArtifactKind, id: &str) -> StoreResult<String> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound {
                kind,
                id: id.to_string(),
            }
        } else {
            StoreError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Whether `path` is an existing regular file. Absence is not an error.
pub(crate) fn file_exists(path: &Path) -> StoreResult<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(StoreError::PathStat {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn read_dir(dir: &Path) -> StoreResult<Vec<fs::DirEntry>> {
    let dir_err = |source| StoreError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(dir_err)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(dir_err)?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Subdirectories of `dir`, sorted by name.
pub(crate) fn subdirs(dir: &Path) -> StoreResult<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    for entry in read_dir(dir)? {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| StoreError::PathStat {
            path: path.clone(),
            source,
        })?;
        if !file_type.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            out.push((name.to_string(), path));
        }
    }
    Ok(out)
}

/// Artifact files (`*.yaml`) directly inside `dir`, with their mtimes.
pub(crate) fn artifact_files(dir: &Path) -> StoreResult<Vec<ArtifactEntry>> {
    let mut out = Vec::new();
    for entry in read_dir(dir)? {
        let name = entry.file_name();
        let Some(stem) = name.to_str().and_then(artifact_stem) else {
            continue;
        };
        let path = entry.path();
        let meta = entry.metadata().map_err(|source| StoreError::PathStat {
            path: path.clone(),
            source,
        })?;
        if !meta.is_file() {
            continue;
        }
        let modified = modified(&path, &meta)?;
        out.push(ArtifactEntry {
            stem: stem.to_string(),
            path,
            modified,
        });
    }
    Ok(out)
}

pub(crate) fn modified(path: &Path, meta: &fs::Metadata) -> StoreResult<SystemTime> {
    meta.modified().map_err(|source| StoreError::PathStat {
        path: path.to_path_buf(),
        source,
    })
}
