//! Foundation types for ReqCorder.
//!
//! Every other ReqCorder crate depends on `reqcorder-types`.
//!
//! # Key Types
//!
//! - [`Template`]: user-authored request declaration
//! - [`Request`]: resolved, executable request carrying its template hash
//! - [`Response`]: captured execution result with timing and cookies
//! - [`ContentHash`]: 128-bit content-addressed identity
//! - [`ResponseId`]: time-ordered response identifier
//! - [`ArtifactKind`]: template, request or response
//!
//! The [`codec`] module holds the canonical YAML encoding that hashes are
//! computed over.

pub mod artifact;
pub mod codec;
pub mod error;
pub mod hash;
pub mod response_id;

pub use artifact::{
    is_error_status, ArtifactKind, Cookie, Request, Response, Template, Timing,
    ERROR_STATUS_THRESHOLD, FAILED_REQUEST_STATUS,
};
pub use codec::{CodecError, CodecResult};
pub use error::TypeError;
pub use hash::{ContentHash, HASH_LEN};
pub use response_id::{parse_timestamp, ResponseId};
