//! Read path: lookups by hash or ID.

use std::path::PathBuf;

use reqcorder_types::codec;
use reqcorder_types::{ArtifactKind, Request, Response, Template};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::fsio;
use crate::layout::check_id;
use crate::store::RecordStore;

/// An artifact read back from the store.
///
/// `text` is the stored YAML exactly as it sits on disk; `value` is its
/// decoded form.
#[derive(Clone, Debug, PartialEq)]
pub struct Stored<T> {
    pub path: PathBuf,
    pub text: String,
    pub value: T,
}

impl RecordStore {
    /// Read `templates/<hash>.yaml`.
    pub fn template_by_hash(&self, template_hash: &str) -> StoreResult<Stored<Template>> {
        check_id(ArtifactKind::Template, template_hash)?;
        fsio::ensure_dir(&self.layout().templates_dir())?;
        let path = self.layout().template_file(template_hash);
        load(path, ArtifactKind::Template, template_hash)
    }

    /// Find a request by hash alone, scanning every template directory.
    ///
    /// Directories are visited in name order; the first match wins.
    pub fn request_by_hash(&self, request_hash: &str) -> StoreResult<Stored<Request>> {
        check_id(ArtifactKind::Request, request_hash)?;
        let root = self.layout().requests_dir();
        fsio::ensure_dir(&root)?;

        for (template_hash, _) in fsio::subdirs(&root)? {
            let candidate = self.layout().request_file(&template_hash, request_hash);
            if fsio::file_exists(&candidate)? {
                debug!(%request_hash, %template_hash, "request located");
                return load(candidate, ArtifactKind::Request, request_hash);
            }
        }
        Err(not_found(ArtifactKind::Request, request_hash))
    }

    /// Read a request when its template is already known. No scan.
    pub fn request(&self, template_hash: &str, request_hash: &str) -> StoreResult<Stored<Request>> {
        check_id(ArtifactKind::Template, template_hash)?;
        check_id(ArtifactKind::Request, request_hash)?;
        let path = self.layout().request_file(template_hash, request_hash);
        load(path, ArtifactKind::Request, request_hash)
    }

    /// Find a response by ID alone, scanning every request directory.
    pub fn response_by_id(&self, response_id: &str) -> StoreResult<Stored<Response>> {
        check_id(ArtifactKind::Response, response_id)?;
        let root = self.layout().responses_dir();
        fsio::ensure_dir(&root)?;

        for (request_hash, _) in fsio::subdirs(&root)? {
            let candidate = self.layout().response_file(&request_hash, response_id);
            if fsio::file_exists(&candidate)? {
                debug!(%response_id, %request_hash, "response located");
                return load(candidate, ArtifactKind::Response, response_id);
            }
        }
        Err(not_found(ArtifactKind::Response, response_id))
    }

    /// Read a response when its request is already known. No scan.
    pub fn response(&self, request_hash: &str, response_id: &str) -> StoreResult<Stored<Response>> {
        check_id(ArtifactKind::Request, request_hash)?;
        check_id(ArtifactKind::Response, response_id)?;
        let path = self.layout().response_file(request_hash, response_id);
        load(path, ArtifactKind::Response, response_id)
    }
}

fn load<T: DeserializeOwned>(path: PathBuf, kind: ArtifactKind, id: &str) -> StoreResult<Stored<T>> {
    let text = fsio::read_artifact(&path, kind, id)?;
    let value = codec::from_yaml(kind_label(kind), &text)?;
    Ok(Stored { path, text, value })
}

fn kind_label(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Template => "template",
        ArtifactKind::Request => "request",
        ArtifactKind::Response => "response",
    }
}

fn not_found(kind: ArtifactKind, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;

    use super::*;
    use crate::clock::ManualIdSource;

    fn store_in(dir: &std::path::Path) -> RecordStore {
        let start = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap();
        RecordStore::new(dir.join("store"), Box::new(ManualIdSource::new(start)))
    }

    fn record(store: &RecordStore, url: &str, status: u16) -> crate::RecordReceipt {
        let template = Template {
            url: url.into(),
            method: "GET".into(),
            ..Template::default()
        };
        let request = Request {
            url: url.into(),
            method: "GET".into(),
            timeout: 30.0,
            ssl_verify: true,
            ..Request::default()
        };
        let response = Response {
            status_code: status,
            ..Response::default()
        };
        store.record(&template, &request, &response).unwrap()
    }

    #[test]
    fn missing_template_on_initialized_store_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.init().unwrap();
        let err = store.template_by_hash("doesnotexist").unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err}");
    }

    #[test]
    fn missing_template_root_is_a_stat_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let err = store.template_by_hash("doesnotexist").unwrap_err();
        assert!(matches!(err, StoreError::PathStat { .. }));
    }

    #[test]
    fn template_root_occupied_by_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.layout().templates_dir(), b"oops").unwrap();
        let err = store.template_by_hash("abc").unwrap_err();
        assert!(matches!(err, StoreError::NotADirectory { .. }));
    }

    #[test]
    fn template_by_hash_returns_stored_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let receipt = record(&store, "https://example1.com", 200);
        let stored = store
            .template_by_hash(&receipt.template_hash.to_hex())
            .unwrap();
        assert_eq!(stored.value.url, "https://example1.com");
        assert_eq!(stored.text, fs::read_to_string(&stored.path).unwrap());
    }

    #[test]
    fn request_by_hash_scans_every_template_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let a = record(&store, "https://example1.com", 200);
        let b = record(&store, "https://example2.com", 200);
        assert_ne!(a.template_hash, b.template_hash);

        for receipt in [&a, &b] {
            let stored = store
                .request_by_hash(&receipt.request_hash.to_hex())
                .unwrap();
            assert_eq!(stored.value.template_hash, Some(receipt.template_hash));
        }
        let err = store.request_by_hash("ffffffffffffffffffffffffffffffff").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn response_by_id_scans_every_request_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let a = record(&store, "https://example1.com", 200);
        let b = record(&store, "https://example2.com", 503);

        let sa = store.response_by_id(a.response_id.as_str()).unwrap();
        let sb = store.response_by_id(b.response_id.as_str()).unwrap();
        assert_eq!(sa.value.status_code, 200);
        assert_eq!(sb.value.status_code, 503);
        assert_eq!(sb.value.request_hash, Some(b.request_hash));

        let err = store.response_by_id("20000101_000000_000_0000").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn direct_lookups_need_no_scan() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let receipt = record(&store, "https://example1.com", 201);
        let t = receipt.template_hash.to_hex();
        let r = receipt.request_hash.to_hex();

        let response = store.response(&r, receipt.response_id.as_str()).unwrap();
        assert_eq!(response.value.status_code, 201);
        let request = store.request(&t, &r).unwrap();
        assert_eq!(request.value.url, "https://example1.com");

        assert!(store.response(&r, "nope").unwrap_err().is_not_found());
        assert!(store.request(&r, &t).unwrap_err().is_not_found());
    }

    #[test]
    fn path_like_identifiers_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.init().unwrap();
        assert!(store.template_by_hash("../store").unwrap_err().is_not_found());
        assert!(store.response_by_id("a/b").unwrap_err().is_not_found());
    }

    #[test]
    fn corrupt_artifact_is_a_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.init().unwrap();
        fs::write(store.layout().template_file("bad"), b"url: [unterminated").unwrap();
        let err = store.template_by_hash("bad").unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }
}
