use std::path::{Path, PathBuf};

use reqcorder_types::ArtifactKind;
use tracing::debug;

use crate::clock::{IdSource, SystemIdSource};
use crate::error::StoreResult;
use crate::fsio;
use crate::layout::Layout;

/// Directory-tree-backed record store.
///
/// There is no index, manifest or transaction log: every lookup and every
/// listing is derived from the directory tree at call time. Response IDs are
/// minted by the [`IdSource`] handed in at construction.
pub struct RecordStore {
    layout: Layout,
    ids: Box<dyn IdSource>,
}

impl RecordStore {
    /// Open a store rooted at `root`. Nothing is created until [`init`](Self::init)
    /// or the first [`record`](Self::record).
    pub fn new(root: impl Into<PathBuf>, ids: Box<dyn IdSource>) -> Self {
        Self {
            layout: Layout::new(root),
            ids,
        }
    }

    /// Open a store that mints IDs from the wall clock.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Box::new(SystemIdSource::new()))
    }

    /// Create the root and the three top-level directories. Idempotent.
    pub fn init(&self) -> StoreResult<()> {
        fsio::create_dir_all(self.layout.root())?;
        for kind in [
            ArtifactKind::Template,
            ArtifactKind::Request,
            ArtifactKind::Response,
        ] {
            fsio::create_dir_all(&self.layout.kind_dir(kind))?;
        }
        debug!(root = %self.layout.root().display(), "record store initialized");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn ids(&self) -> &dyn IdSource {
        self.ids.as_ref()
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("root", &self.layout.root())
            .finish_non_exhaustive()
    }
}
