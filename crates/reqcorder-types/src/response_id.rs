use std::fmt;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length of the `YYYYMMDD_HHMMSS_mmm` timestamp prefix.
pub const TIMESTAMP_PREFIX_LEN: usize = 19;

/// Counter suffixes wrap at this modulus (four digits).
pub const COUNTER_MODULUS: u64 = 10_000;

/// Identifier of a single recorded response.
///
/// Format: `YYYYMMDD_HHMMSS_mmm_CCCC`, a UTC timestamp to the millisecond
/// followed by a zero-padded counter. IDs minted by one source sort
/// lexicographically in creation order. Unlike templates and requests,
/// responses are never content-addressed: every execution gets a new ID.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(String);

impl ResponseId {
    /// Build an ID from a timestamp and a raw counter value.
    pub fn from_parts(at: DateTime<Utc>, counter: u64) -> Self {
        Self(format!(
            "{}_{:03}_{:04}",
            at.format("%Y%m%d_%H%M%S"),
            at.timestamp_subsec_millis().min(999),
            counter % COUNTER_MODULUS
        ))
    }

    /// Wrap an existing identifier (e.g. a file stem) without validation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the creation time embedded in the first 19 characters.
    pub fn timestamp(&self) -> Result<DateTime<Utc>, TypeError> {
        parse_timestamp(&self.0)
    }
}

/// Parse the `YYYYMMDD_HHMMSS_mmm` prefix of a response ID into UTC time.
pub fn parse_timestamp(id: &str) -> Result<DateTime<Utc>, TypeError> {
    let invalid = |reason: &str| TypeError::InvalidTimestamp {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    let prefix = id
        .get(..TIMESTAMP_PREFIX_LEN)
        .ok_or_else(|| invalid("shorter than 19 characters"))?;
    if !prefix.is_ascii() {
        return Err(invalid("contains non-ascii characters"));
    }
    let (date_time, millis) = prefix.split_at(15);
    let millis = millis
        .strip_prefix('_')
        .ok_or_else(|| invalid("missing separator before milliseconds"))?;
    if !millis.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("milliseconds are not numeric"));
    }
    let millis: u32 = millis
        .parse()
        .map_err(|_| invalid("milliseconds are not numeric"))?;

    let naive = NaiveDateTime::parse_from_str(date_time, "%Y%m%d_%H%M%S")
        .map_err(|e| invalid(&e.to_string()))?;
    let naive = naive
        .with_nanosecond(millis * 1_000_000)
        .ok_or_else(|| invalid("milliseconds out of range"))?;
    Ok(naive.and_utc())
}

impl fmt::Debug for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResponseId({})", self.0)
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResponseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
