//! Single-artifact display with back-references.

use tracing::debug;

use crate::error::HistoryResult;
use crate::listing::History;

impl History<'_> {
    /// The stored template, under a `Template:` heading.
    pub fn show_template(&self, template_hash: &str) -> HistoryResult<String> {
        let stored = self.store().template_by_hash(template_hash)?;
        debug!(%template_hash, "showing template");
        Ok(format!("\nTemplate:\n\n{}", stored.text))
    }

    /// The stored request, preceded by the template it came from.
    pub fn show_request(&self, request_hash: &str) -> HistoryResult<String> {
        let stored = self.store().request_by_hash(request_hash)?;
        let template_hash = hash_or_unknown(stored.value.template_hash.map(|h| h.to_hex()));
        debug!(%request_hash, %template_hash, "showing request");
        Ok(format!(
            "\nTemplate Hash: {template_hash}\nRequest:\n\n{}",
            stored.text
        ))
    }

    /// The stored response, preceded by its template and request hashes.
    pub fn show_response(&self, response_id: &str) -> HistoryResult<String> {
        let stored = self.store().response_by_id(response_id)?;
        let template_hash = hash_or_unknown(stored.value.template_hash.map(|h| h.to_hex()));
        let request_hash = hash_or_unknown(stored.value.request_hash.map(|h| h.to_hex()));
        debug!(%response_id, %request_hash, "showing response");
        Ok(format!(
            "\nTemplate Hash: {template_hash}\nRequest Hash: {request_hash}\nResponse:\n\n{}",
            stored.text
        ))
    }
}

fn hash_or_unknown(hash: Option<String>) -> String {
    hash.unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use reqcorder_store::{ManualIdSource, RecordStore, StoreError};
    use reqcorder_types::{Request, Response, Template};

    use super::*;
    use crate::error::HistoryError;

    fn recorded() -> (tempfile::TempDir, RecordStore, reqcorder_store::RecordReceipt) {
        let dir = tempfile::tempdir().unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap();
        let store = RecordStore::new(dir.path().join("store"), Box::new(ManualIdSource::new(start)));
        let receipt = store
            .record(
                &Template {
                    url: "https://example1.com".into(),
                    method: "GET".into(),
                    ..Template::default()
                },
                &Request {
                    url: "https://example1.com".into(),
                    method: "GET".into(),
                    timeout: 30.0,
                    ssl_verify: true,
                    ..Request::default()
                },
                &Response {
                    status_code: 200,
                    body: "hello".into(),
                    ..Response::default()
                },
            )
            .unwrap();
        (dir, store, receipt)
    }

    #[test]
    fn show_response_names_both_hashes() {
        let (_dir, store, receipt) = recorded();
        let out = History::new(&store)
            .show_response(receipt.response_id.as_str())
            .unwrap();
        assert!(out.starts_with(&format!(
            "\nTemplate Hash: {}\nRequest Hash: {}\nResponse:\n\n",
            receipt.template_hash, receipt.request_hash
        )));
        assert!(out.contains("body: hello"));
    }

    #[test]
    fn show_request_names_template() {
        let (_dir, store, receipt) = recorded();
        let out = History::new(&store)
            .show_request(&receipt.request_hash.to_hex())
            .unwrap();
        assert!(out.starts_with(&format!(
            "\nTemplate Hash: {}\nRequest:\n\n",
            receipt.template_hash
        )));
        assert!(out.contains("url: https://example1.com"));
    }

    #[test]
    fn show_template_prints_stored_yaml() {
        let (_dir, store, receipt) = recorded();
        let out = History::new(&store)
            .show_template(&receipt.template_hash.to_hex())
            .unwrap();
        assert!(out.starts_with("\nTemplate:\n\nurl: https://example1.com\n"));
    }

    #[test]
    fn show_unknown_is_not_found() {
        let (_dir, store, _) = recorded();
        let err = History::new(&store).show_template("doesnotexist").unwrap_err();
        assert!(matches!(err, HistoryError::Store(StoreError::NotFound { .. })));
    }
}
