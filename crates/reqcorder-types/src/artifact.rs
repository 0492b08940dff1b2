//! In-memory shapes of the three recorded artifacts.
//!
//! Every map is a [`BTreeMap`] and every optional value is skipped when
//! absent, so one logical value always serializes to the same bytes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hash::ContentHash;

/// Status code stamped on responses synthesized for failed executions.
pub const FAILED_REQUEST_STATUS: u16 = 1000;

/// Status codes at or above this value are shown as failures.
pub const ERROR_STATUS_THRESHOLD: u16 = 400;

/// The three kinds of artifact kept in a record store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Template,
    Request,
    Response,
}

impl ArtifactKind {
    /// Name of the store subdirectory holding this kind.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Template => "templates",
            Self::Request => "requests",
            Self::Response => "responses",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Template => "template",
            Self::Request => "request",
            Self::Response => "response",
        };
        f.write_str(name)
    }
}

impl FromStr for ArtifactKind {
    type Err = TypeError;

    /// Accepts singular and plural spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" | "templates" => Ok(Self::Template),
            "request" | "requests" => Ok(Self::Request),
            "response" | "responses" => Ok(Self::Response),
            _ => Err(TypeError::UnknownKind(s.to_string())),
        }
    }
}

/// A user-authored request declaration, before substitution and defaulting.
///
/// Unset strings and empty maps are omitted when serialized, so an empty
/// value and a missing key canonicalize identically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub cookies: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_header_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    /// Timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub body_vars: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_verify: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ca_cert_path: String,
}

/// A fully resolved, executable request.
///
/// `template_hash` is stamped by the record store before the request is
/// hashed, so it is part of the request's identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_hash: Option<ContentHash>,
    pub url: String,
    pub method: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub cookies: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_header_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    /// Timeout in seconds.
    pub timeout: f64,
    pub ssl_verify: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ca_cert_path: String,
}

impl Request {
    pub fn timeout_duration(&self) -> Duration {
        if self.timeout.is_finite() && self.timeout > 0.0 {
            Duration::from_secs_f64(self.timeout)
        } else {
            Duration::ZERO
        }
    }
}

/// A cookie observed on a response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

/// Per-phase timing of one execution. Durations are stored in nanoseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    #[serde(with = "nanos")]
    pub dns_lookup: Duration,
    #[serde(with = "nanos")]
    pub tcp_connect: Duration,
    #[serde(with = "nanos")]
    pub tls_handshake: Duration,
    #[serde(with = "nanos")]
    pub time_to_first_byte: Duration,
    #[serde(with = "nanos")]
    pub total_duration: Duration,
}

/// The captured result of executing a request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_hash: Option<ContentHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_hash: Option<ContentHash>,
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub size_bytes: u64,
    pub timing: Timing,
    pub cookies: Vec<Cookie>,
}

impl Response {
    /// Whether the status code counts as a failure for display.
    pub fn is_error_status(&self) -> bool {
        is_error_status(self.status_code)
    }
}

pub fn is_error_status(status_code: u16) -> bool {
    status_code >= ERROR_STATUS_THRESHOLD
}

mod nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_nanos)
    }
}
