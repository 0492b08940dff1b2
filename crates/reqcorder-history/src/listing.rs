//! Newest-first listings with limits and per-row enrichment.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqcorder_store::{FileInfo, RecordStore};
use reqcorder_types::{is_error_status, parse_timestamp};
use tracing::debug;

use crate::error::{HistoryError, HistoryResult};

/// Glyph appended to successful status codes.
pub const SUCCESS_GLYPH: &str = "✅";
/// Glyph appended to status codes at or above 400.
pub const FAILURE_GLYPH: &str = "❌";

/// Which responses to list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseFilter {
    All,
    /// Responses to one request hash.
    Request(String),
    /// Responses to every request derived from one template hash.
    Template(String),
}

/// One listed response, enriched from its stored content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseRow {
    pub response_id: String,
    pub request_hash: String,
    pub status_code: u16,
    pub total_duration: Duration,
    /// Creation time parsed from the response ID.
    pub timestamp: DateTime<Utc>,
}

impl ResponseRow {
    pub fn is_error(&self) -> bool {
        is_error_status(self.status_code)
    }

    pub fn glyph(&self) -> &'static str {
        status_glyph(self.status_code)
    }
}

/// One listed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestRow {
    pub request_hash: String,
    pub template_hash: String,
    pub modified: DateTime<Utc>,
}

/// One listed template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateRow {
    pub template_hash: String,
    pub modified: DateTime<Utc>,
}

/// Success/failure glyph for a status code.
pub fn status_glyph(status_code: u16) -> &'static str {
    if is_error_status(status_code) {
        FAILURE_GLYPH
    } else {
        SUCCESS_GLYPH
    }
}

/// Keep the first `limit` entries; `0` keeps everything.
pub fn apply_limit<T>(items: &mut Vec<T>, limit: usize) {
    if limit > 0 {
        items.truncate(limit);
    }
}

/// Read-only history views over a [`RecordStore`].
pub struct History<'a> {
    store: &'a RecordStore,
}

impl<'a> History<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    /// The `limit` most recent responses matching `filter`.
    ///
    /// The limit is applied after sorting, then every remaining response is
    /// re-read for its status and total time. A failure on any row aborts the
    /// whole listing.
    pub fn responses(&self, filter: &ResponseFilter, limit: usize) -> HistoryResult<Vec<ResponseRow>> {
        let mut files = match filter {
            ResponseFilter::All => self.store.list_responses()?,
            ResponseFilter::Request(hash) => self.store.list_responses_by_request_hash(hash)?,
            ResponseFilter::Template(hash) => self.store.list_responses_by_template_hash(hash)?,
        };
        let total = files.len();
        apply_limit(&mut files, limit);
        debug!(?filter, total, limit, kept = files.len(), "listing responses");

        files.iter().map(|file| self.response_row(file)).collect()
    }

    /// The `limit` most recent requests, optionally only those of one template.
    pub fn requests(&self, template_hash: Option<&str>, limit: usize) -> HistoryResult<Vec<RequestRow>> {
        let mut files = match template_hash {
            Some(hash) => self.store.list_requests_by_template_hash(hash)?,
            None => self.store.list_requests()?,
        };
        apply_limit(&mut files, limit);
        debug!(?template_hash, limit, kept = files.len(), "listing requests");

        files
            .iter()
            .map(|file| {
                let template_hash = file.template_hash.clone().unwrap_or_default();
                let request_hash = file.request_hash.clone().unwrap_or_default();
                // Re-read so an unreadable or corrupt request fails the listing.
                self.store.request(&template_hash, &request_hash)?;
                Ok(RequestRow {
                    request_hash,
                    template_hash,
                    modified: file.modified_at(),
                })
            })
            .collect()
    }

    /// The `limit` most recent templates.
    pub fn templates(&self, limit: usize) -> HistoryResult<Vec<TemplateRow>> {
        let mut files = self.store.list_templates()?;
        apply_limit(&mut files, limit);
        debug!(limit, kept = files.len(), "listing templates");

        Ok(files
            .iter()
            .map(|file| TemplateRow {
                template_hash: file.template_hash.clone().unwrap_or_default(),
                modified: file.modified_at(),
            })
            .collect())
    }

    fn response_row(&self, file: &FileInfo) -> HistoryResult<ResponseRow> {
        let response_id = file.response_id.clone().unwrap_or_default();
        let request_hash = file.request_hash.clone().unwrap_or_default();
        let stored = self.store.response(&request_hash, &response_id)?;
        let timestamp = parse_timestamp(&response_id).map_err(|source| HistoryError::TimestampParse {
            id: response_id.clone(),
            source,
        })?;
        Ok(ResponseRow {
            response_id,
            request_hash,
            status_code: stored.value.status_code,
            total_duration: stored.value.timing.total_duration,
            timestamp,
        })
    }
}
