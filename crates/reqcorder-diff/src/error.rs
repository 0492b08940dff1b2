//! Error types for the diff crate.

use reqcorder_store::StoreError;

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Resolving one side of the comparison failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing the rendered diff failed.
    #[error("failed to render diff: {0}")]
    Render(#[source] std::io::Error),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
