//! Error types for template resolution and request execution.

use std::path::PathBuf;

/// A template that cannot become a request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),
}

/// Errors raised before a request reaches the network.
///
/// Transport failures are not errors here; they come back as
/// [`Execution::Failed`](crate::Execution::Failed) so they can be recorded.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to read CA certificate {path}: {source}")]
    CaCertRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CA certificate {path}: {source}")]
    CaCertParse {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// Convenience alias for execution results.
pub type ExecResult<T> = Result<T, ExecError>;
