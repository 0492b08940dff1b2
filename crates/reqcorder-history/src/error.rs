//! Error types for the history crate.

use reqcorder_store::StoreError;
use reqcorder_types::TypeError;

/// Errors that can occur while building a history view.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A response ID does not start with a `YYYYMMDD_HHMMSS_mmm` timestamp.
    #[error("failed to parse timestamp of response {id}: {source}")]
    TimestampParse {
        id: String,
        #[source]
        source: TypeError,
    },
}

/// Convenience alias for history results.
pub type HistoryResult<T> = Result<T, HistoryError>;
