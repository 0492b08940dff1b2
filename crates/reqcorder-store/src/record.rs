//! Write path: hash, stamp, and persist one execution.

use std::thread;

use reqcorder_crypto::ContentHasher;
use reqcorder_types::codec;
use reqcorder_types::{ArtifactKind, ContentHash, Request, Response, ResponseId, Template};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::fsio;
use crate::store::RecordStore;

/// Identities assigned by one [`RecordStore::record`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordReceipt {
    pub template_hash: ContentHash,
    pub request_hash: ContentHash,
    pub response_id: ResponseId,
}

/// The three canonical documents of one execution, hashes already stamped.
#[derive(Clone, Debug)]
pub struct PreparedRecord {
    pub template_hash: ContentHash,
    pub request_hash: ContentHash,
    pub template_yaml: String,
    pub request_yaml: String,
    pub response_yaml: String,
}

/// Serialize and hash the artifacts of one execution.
///
/// The template hash is stamped onto the request before the request is
/// serialized, and both hashes are stamped onto the response.
pub fn prepare(
    template: &Template,
    request: &Request,
    response: &Response,
) -> StoreResult<PreparedRecord> {
    let template_yaml = codec::to_yaml("template", template)?;
    let template_hash = ContentHasher::TEMPLATE.hash(template_yaml.as_bytes());

    let mut request = request.clone();
    request.template_hash = Some(template_hash);
    let request_yaml = codec::to_yaml("request", &request)?;
    let request_hash = ContentHasher::REQUEST.hash(request_yaml.as_bytes());

    let mut response = response.clone();
    response.request_hash = Some(request_hash);
    response.template_hash = Some(template_hash);
    let response_yaml = codec::to_yaml("response", &response)?;

    Ok(PreparedRecord {
        template_hash,
        request_hash,
        template_yaml,
        request_yaml,
        response_yaml,
    })
}

impl RecordStore {
    /// Persist a template, its resolved request, and one response.
    ///
    /// The three files are written concurrently. If any write fails the first
    /// error (in template, request, response order) is returned; writes that
    /// already succeeded are left in place. The response ID is minted inside
    /// the response write, so it reflects commit time.
    pub fn record(
        &self,
        template: &Template,
        request: &Request,
        response: &Response,
    ) -> StoreResult<RecordReceipt> {
        let prepared = prepare(template, request, response)?;
        self.commit(&prepared)
    }

    /// Write an already prepared record.
    pub fn commit(&self, prepared: &PreparedRecord) -> StoreResult<RecordReceipt> {
        let template_hex = prepared.template_hash.to_hex();
        let request_hex = prepared.request_hash.to_hex();
        debug!(
            template_hash = %template_hex,
            request_hash = %request_hex,
            "recording execution"
        );

        let (template, request, response) = thread::scope(|scope| {
            let template = scope.spawn(|| {
                let path = self.layout().template_file(&template_hex);
                fsio::write_atomic(&path, prepared.template_yaml.as_bytes())
            });
            let request = scope.spawn(|| {
                let path = self.layout().request_file(&template_hex, &request_hex);
                fsio::write_atomic(&path, prepared.request_yaml.as_bytes())
            });
            let response = scope.spawn(|| {
                let id = self.ids().next_id();
                let path = self.layout().response_file(&request_hex, id.as_str());
                fsio::write_atomic(&path, prepared.response_yaml.as_bytes()).map(|()| id)
            });
            (
                joined(ArtifactKind::Template, template.join()),
                joined(ArtifactKind::Request, request.join()),
                joined(ArtifactKind::Response, response.join()),
            )
        });

        for (kind, outcome) in [
            (ArtifactKind::Template, template.as_ref().err()),
            (ArtifactKind::Request, request.as_ref().err()),
            (ArtifactKind::Response, response.as_ref().err()),
        ] {
            if let Some(err) = outcome {
                warn!(%kind, error = %err, "artifact write failed, siblings are not rolled back");
            }
        }

        template?;
        request?;
        let response_id = response?;

        debug!(response_id = %response_id, "execution recorded");
        Ok(RecordReceipt {
            template_hash: prepared.template_hash,
            request_hash: prepared.request_hash,
            response_id,
        })
    }
}

fn joined<T>(kind: ArtifactKind, outcome: thread::Result<StoreResult<T>>) -> StoreResult<T> {
    outcome.map_err(|_| StoreError::TaskPanicked(kind))?
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use chrono::TimeZone;

    use super::*;
    use crate::clock::ManualIdSource;

    fn store_in(dir: &std::path::Path) -> RecordStore {
        let start = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap();
        let store = RecordStore::new(dir.join("store"), Box::new(ManualIdSource::new(start)));
        store.init().unwrap();
        store
    }

    fn template() -> Template {
        Template {
            url: "https://example1.com".into(),
            method: "GET".into(),
            body: "key: value".into(),
            ..Template::default()
        }
    }

    fn request(url: &str, method: &str) -> Request {
        Request {
            url: url.into(),
            method: method.into(),
            body: "key: value".into(),
            user_agent: "ReqCorder".into(),
            timeout: 30.0,
            ssl_verify: true,
            ..Request::default()
        }
    }

    fn response(status: u16) -> Response {
        Response {
            status_code: status,
            headers: BTreeMap::from([("Content-Type".into(), "text/plain".into())]),
            body: "ok".into(),
            size_bytes: 2,
            ..Response::default()
        }
    }

    #[test]
    fn record_writes_three_files_in_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let receipt = store
            .record(&template(), &request("https://example1.com", "GET"), &response(200))
            .unwrap();

        let t = receipt.template_hash.to_hex();
        let r = receipt.request_hash.to_hex();
        let layout = store.layout();
        assert!(layout.template_file(&t).is_file());
        assert!(layout.request_file(&t, &r).is_file());
        assert!(layout.response_file(&r, receipt.response_id.as_str()).is_file());
        assert_eq!(receipt.response_id.as_str(), "20240115_103045_000_0001");
    }

    #[test]
    fn hashes_are_stamped_onto_stored_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let receipt = store
            .record(&template(), &request("https://example1.com", "GET"), &response(200))
            .unwrap();

        let t = receipt.template_hash.to_hex();
        let r = receipt.request_hash.to_hex();
        let stored_request: Request = codec::from_yaml(
            "request",
            &fs::read_to_string(store.layout().request_file(&t, &r)).unwrap(),
        )
        .unwrap();
        assert_eq!(stored_request.template_hash, Some(receipt.template_hash));

        let stored_response: Response = codec::from_yaml(
            "response",
            &fs::read_to_string(store.layout().response_file(&r, receipt.response_id.as_str()))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(stored_response.request_hash, Some(receipt.request_hash));
        assert_eq!(stored_response.template_hash, Some(receipt.template_hash));
    }

    #[test]
    fn request_hash_covers_template_hash() {
        let req = request("https://example1.com", "GET");
        let a = prepare(&template(), &req, &response(200)).unwrap();
        let other = Template {
            timeout: Some(5.0),
            ..template()
        };
        let b = prepare(&other, &req, &response(200)).unwrap();
        assert_ne!(a.template_hash, b.template_hash);
        assert_ne!(a.request_hash, b.request_hash);
    }

    #[test]
    fn same_template_twice_leaves_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let first = store
            .record(&template(), &request("https://example1.com", "GET"), &response(200))
            .unwrap();
        let second = store
            .record(&template(), &request("https://example2.com", "POST"), &response(404))
            .unwrap();

        assert_eq!(first.template_hash, second.template_hash);
        assert_ne!(first.request_hash, second.request_hash);
        let templates: Vec<_> = fs::read_dir(store.layout().templates_dir())
            .unwrap()
            .collect();
        assert_eq!(templates.len(), 1);
    }

    #[test]
    fn identical_executions_get_new_response_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let req = request("https://example1.com", "GET");
        let a = store.record(&template(), &req, &response(200)).unwrap();
        let b = store.record(&template(), &req, &response(200)).unwrap();

        assert_eq!(a.request_hash, b.request_hash);
        assert_ne!(a.response_id, b.response_id);
        let responses: Vec<_> = fs::read_dir(store.layout().request_responses_dir(&a.request_hash.to_hex()))
            .unwrap()
            .collect();
        assert_eq!(responses.len(), 2);
    }

    #[test]
    fn parallel_records_share_hashed_files() {
        const WRITERS: usize = 8;
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let req = request("https://example1.com", "GET");

        let receipts: Vec<RecordReceipt> = thread::scope(|scope| {
            let handles: Vec<_> = (0..WRITERS)
                .map(|_| scope.spawn(|| store.record(&template(), &req, &response(200))))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        let first = &receipts[0];
        assert!(receipts
            .iter()
            .all(|r| r.template_hash == first.template_hash && r.request_hash == first.request_hash));
        let ids: std::collections::HashSet<_> = receipts.iter().map(|r| r.response_id.clone()).collect();
        assert_eq!(ids.len(), WRITERS);

        let t = first.template_hash.to_hex();
        let r = first.request_hash.to_hex();
        assert_eq!(fs::read_dir(store.layout().templates_dir()).unwrap().count(), 1);
        assert_eq!(
            fs::read_dir(store.layout().template_requests_dir(&t)).unwrap().count(),
            1
        );
        assert_eq!(store.template_by_hash(&t).unwrap().value, template());
        assert_eq!(
            store.request_by_hash(&r).unwrap().value.template_hash,
            Some(first.template_hash)
        );

        assert_eq!(
            fs::read_dir(store.layout().request_responses_dir(&r)).unwrap().count(),
            WRITERS
        );
        for receipt in &receipts {
            let stored = store.response(&r, receipt.response_id.as_str()).unwrap();
            assert_eq!(stored.value.request_hash, Some(first.request_hash));
        }
    }

    #[test]
    fn record_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("fresh"));
        let receipt = store
            .record(&template(), &request("https://example1.com", "GET"), &response(200))
            .unwrap();
        assert!(store
            .layout()
            .template_file(&receipt.template_hash.to_hex())
            .is_file());
    }

    #[test]
    fn failed_write_keeps_succeeded_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let prepared = prepare(
            &template(),
            &request("https://example1.com", "GET"),
            &response(200),
        )
        .unwrap();

        // Block the request's parent directory with a plain file.
        let blocker = store
            .layout()
            .template_requests_dir(&prepared.template_hash.to_hex());
        fs::write(&blocker, b"not a directory").unwrap();

        let err = store.commit(&prepared).unwrap_err();
        assert!(matches!(err, StoreError::CreateDir { .. }));
        assert!(store
            .layout()
            .template_file(&prepared.template_hash.to_hex())
            .is_file());
        let responses = store
            .layout()
            .request_responses_dir(&prepared.request_hash.to_hex());
        assert_eq!(fs::read_dir(responses).unwrap().count(), 1);
    }
}
