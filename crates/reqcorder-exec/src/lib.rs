//! Template resolution and HTTP execution for ReqCorder.
//!
//! [`resolve`] turns a parsed [`Template`](reqcorder_types::Template) into a
//! [`Request`](reqcorder_types::Request): URL and method validation,
//! defaults, `{{key}}` and `{{env:NAME}}` body substitution and auth
//! prefixing. A [`RequestExecutor`] then sends it.
//!
//! # Design Rules
//!
//! 1. Validation happens before anything is written to the store.
//! 2. A transport failure is a recordable outcome, not an error:
//!    [`Execution::Failed`] carries a synthetic response with status 1000.
//! 3. Only phases the HTTP client exposes are timed; DNS, connect and TLS
//!    durations are reported as zero.

pub mod error;
pub mod executor;
pub mod resolve;

pub use error::{ExecError, ExecResult, ValidationError};
pub use executor::{
    canonical_header_name, flatten_headers, Execution, HttpExecutor,
    RequestExecutor, DEFAULT_AUTH_HEADER,
};
pub use resolve::{
    resolve, resolve_with, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, VALID_METHODS,
};
