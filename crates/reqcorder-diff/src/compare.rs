//! Resolving stored artifacts for comparison.

use std::io::Write;

use reqcorder_store::RecordStore;
use reqcorder_types::ArtifactKind;
use tracing::debug;

use crate::error::DiffResult;
use crate::render::{render, DiffMode};

/// Stored text of one artifact, found by its hash or response ID.
pub fn resolve_text(store: &RecordStore, kind: ArtifactKind, id: &str) -> DiffResult<String> {
    let text = match kind {
        ArtifactKind::Template => store.template_by_hash(id)?.text,
        ArtifactKind::Request => store.request_by_hash(id)?.text,
        ArtifactKind::Response => store.response_by_id(id)?.text,
    };
    Ok(text)
}

/// Stored texts of two artifacts of the same kind, source first.
///
/// Either identifier failing to resolve fails the comparison.
pub fn compare(
    store: &RecordStore,
    kind: ArtifactKind,
    source: &str,
    target: &str,
) -> DiffResult<(String, String)> {
    let source_text = resolve_text(store, kind, source)?;
    let target_text = resolve_text(store, kind, target)?;
    debug!(%kind, source, target, "resolved artifacts for diff");
    Ok((source_text, target_text))
}

/// Resolve both artifacts and render their difference, labelled by identifier.
pub fn diff_artifacts<W: Write>(
    w: &mut W,
    store: &RecordStore,
    kind: ArtifactKind,
    source: &str,
    target: &str,
    mode: DiffMode,
    color: bool,
) -> DiffResult<()> {
    let (source_text, target_text) = compare(store, kind, source, target)?;
    render(w, &source_text, &target_text, source, target, mode, color)
}
