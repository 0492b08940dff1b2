use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The leading `YYYYMMDD_HHMMSS_mmm` portion of a response ID is malformed.
    #[error("invalid response id timestamp {id:?}: {reason}")]
    InvalidTimestamp { id: String, reason: String },

    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),
}
