//! Canonical YAML codec for stored artifacts.
//!
//! Content hashes are computed over the bytes produced here, so the encoding
//! must be stable: fields are emitted in declaration order, map keys in
//! sorted order, and unset values are omitted.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::artifact::Template;

/// Errors from encoding or decoding an artifact.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("failed to serialize {what}: {reason}")]
    Serialize { what: &'static str, reason: String },

    #[error("failed to deserialize {what}: {reason}")]
    Deserialize { what: &'static str, reason: String },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Serialize a value to its canonical YAML text.
pub fn to_yaml<T: Serialize>(what: &'static str, value: &T) -> CodecResult<String> {
    serde_yaml::to_string(value).map_err(|e| CodecError::Serialize {
        what,
        reason: e.to_string(),
    })
}

/// Deserialize a value from YAML text.
pub fn from_yaml<T: DeserializeOwned>(what: &'static str, text: &str) -> CodecResult<T> {
    serde_yaml::from_str(text).map_err(|e| CodecError::Deserialize {
        what,
        reason: e.to_string(),
    })
}

/// Parse a user-authored template and return it with its canonical text.
///
/// Formatting that carries no meaning (whitespace, comments, quoting, key
/// order, empty values) does not survive, so two files that describe the
/// same template canonicalize to identical bytes.
pub fn canonicalize_template(raw: &str) -> CodecResult<(Template, String)> {
    let template: Template = from_yaml("template", raw)?;
    let canonical = to_yaml("template", &template)?;
    Ok((template, canonical))
}
