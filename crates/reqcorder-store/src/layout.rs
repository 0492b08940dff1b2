//! On-disk namespace of a record store.
//!
//! ```text
//! <root>/
//!   templates/<TemplateHash>.yaml
//!   requests/<TemplateHash>/<RequestHash>.yaml
//!   responses/<RequestHash>/<ResponseId>.yaml
//! ```

use std::path::{Path, PathBuf};

use reqcorder_types::ArtifactKind;

use crate::error::{StoreError, StoreResult};

/// Extension of every stored artifact.
pub const ARTIFACT_EXT: &str = "yaml";

/// Path arithmetic for a store rooted at one directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Top-level directory for one artifact kind.
    pub fn kind_dir(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.kind_dir(ArtifactKind::Template)
    }

    pub fn requests_dir(&self) -> PathBuf {
        self.kind_dir(ArtifactKind::Request)
    }

    pub fn responses_dir(&self) -> PathBuf {
        self.kind_dir(ArtifactKind::Response)
    }

    pub fn template_file(&self, template_hash: &str) -> PathBuf {
        self.templates_dir().join(file_name(template_hash))
    }

    /// Directory holding every request derived from one template.
    pub fn template_requests_dir(&self, template_hash: &str) -> PathBuf {
        self.requests_dir().join(template_hash)
    }

    pub fn request_file(&self, template_hash: &str, request_hash: &str) -> PathBuf {
        self.template_requests_dir(template_hash)
            .join(file_name(request_hash))
    }

    /// Directory holding every response to one request.
    pub fn request_responses_dir(&self, request_hash: &str) -> PathBuf {
        self.responses_dir().join(request_hash)
    }

    pub fn response_file(&self, request_hash: &str, response_id: &str) -> PathBuf {
        self.request_responses_dir(request_hash)
            .join(file_name(response_id))
    }
}

/// `<id>.yaml`
pub fn file_name(id: &str) -> String {
    format!("{id}.{ARTIFACT_EXT}")
}

/// The identifier encoded in an artifact file name, if it is one.
pub fn artifact_stem(name: &str) -> Option<&str> {
    name.strip_suffix(ARTIFACT_EXT)
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|stem| !stem.is_empty())
}

/// Reject identifiers that would escape their directory.
///
/// Such identifiers cannot name a stored artifact, so they are reported as
/// not found rather than resolved against the filesystem.
pub fn check_id(kind: ArtifactKind, id: &str) -> StoreResult<()> {
    let escapes = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\'])
        || id.contains('\0');
    if escapes {
        return Err(StoreError::NotFound {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}
