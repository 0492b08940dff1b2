use std::io;
use std::path::PathBuf;

use reqcorder_types::{ArtifactKind, CodecError};

/// Errors from record store operations.
///
/// Filesystem failures always carry the offending path. [`StoreError::NotFound`]
/// is kept apart from the I/O variants so callers can report "no such record"
/// rather than "storage broken".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An expected path could not be stat'ed.
    #[error("failed to stat path {path:?}: {source}")]
    PathStat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Something other than a directory occupies an expected directory path.
    #[error("expected directory at {path:?}")]
    NotADirectory { path: PathBuf },

    /// A directory exists but could not be enumerated.
    #[error("failed to read directory {path:?}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The identifier is absent after a successful lookup or scan.
    #[error("{kind} not found: {id}")]
    NotFound { kind: ArtifactKind, id: String },

    #[error("failed to read file {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Encoding or decoding an artifact failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A write task panicked before reporting a result.
    #[error("{0} write task panicked")]
    TaskPanicked(ArtifactKind),
}

impl StoreError {
    /// Returns `true` for the distinguished not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
