//! Performing resolved requests over HTTP.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqcorder_types::{Cookie, Request, Response, Timing, FAILED_REQUEST_STATUS};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, USER_AGENT};
use reqwest::{Certificate, Client, Method};
use tracing::{debug, error, info};

use crate::error::{ExecError, ExecResult};

/// Header carrying credentials when a request names none.
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";

/// Outcome of sending a request.
#[derive(Clone, Debug)]
pub enum Execution {
    /// A response arrived, whatever its status.
    Completed(Response),
    /// The transport failed. `response` is a synthetic record of the failure
    /// with status [`FAILED_REQUEST_STATUS`].
    Failed { response: Response, error: String },
}

impl Execution {
    pub fn response(&self) -> &Response {
        match self {
            Execution::Completed(response) | Execution::Failed { response, .. } => response,
        }
    }

    pub fn into_response(self) -> Response {
        match self {
            Execution::Completed(response) | Execution::Failed { response, .. } => response,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Execution::Failed { .. })
    }
}

/// Sends a resolved [`Request`] and reports what came back.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &Request) -> ExecResult<Execution>;
}

/// [`RequestExecutor`] backed by `reqwest` with rustls.
#[derive(Clone, Debug, Default)]
pub struct HttpExecutor;

impl HttpExecutor {
    pub fn new() -> Self {
        Self
    }

    fn client(&self, request: &Request) -> ExecResult<Client> {
        let mut builder = Client::builder().no_proxy();
        let timeout = request.timeout_duration();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        if !request.ssl_verify {
            builder = builder.danger_accept_invalid_certs(true);
        } else if !request.ca_cert_path.is_empty() {
            let path = PathBuf::from(&request.ca_cert_path);
            debug!(path = %path.display(), "adding CA certificate");
            let pem = std::fs::read(&path).map_err(|source| ExecError::CaCertRead {
                path: path.clone(),
                source,
            })?;
            let cert = Certificate::from_pem(&pem)
                .map_err(|source| ExecError::CaCertParse { path, source })?;
            builder = builder.add_root_certificate(cert);
        }
        builder.build().map_err(ExecError::Client)
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &Request) -> ExecResult<Execution> {
        let client = self.client(request)?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ExecError::InvalidMethod(request.method.clone()))?;
        let headers = outbound_headers(request)?;

        let mut builder = client.request(method, &request.url).headers(headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        info!(method = %request.method, url = %request.url, timeout = request.timeout, "executing request");
        let start = Instant::now();
        let sent = builder.send().await;
        let first_byte = start.elapsed();

        let response = match sent {
            Ok(response) => response,
            Err(e) => return Ok(failed(e, start.elapsed())),
        };

        let status_code = response.status().as_u16();
        let headers = flatten_headers(response.headers());
        let cookies = response.cookies().map(captured_cookie).collect();

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Ok(failed(e, start.elapsed())),
        };
        let total = start.elapsed();
        info!(status_code, size = body.len(), duration = ?total, "request completed");

        Ok(Execution::Completed(Response {
            request_hash: None,
            template_hash: None,
            status_code,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
            size_bytes: body.len() as u64,
            timing: Timing {
                time_to_first_byte: first_byte,
                total_duration: total,
                ..Timing::default()
            },
            cookies,
        }))
    }
}

fn failed(e: reqwest::Error, elapsed: Duration) -> Execution {
    error!(error = %e, "request failed");
    let error = e.to_string();
    Execution::Failed {
        response: Response {
            status_code: FAILED_REQUEST_STATUS,
            body: format!("This request failed: {error}\n Refer to the logs for more details"),
            timing: Timing {
                total_duration: elapsed,
                ..Timing::default()
            },
            ..Response::default()
        },
        error,
    }
}

fn header_name(name: &str) -> ExecResult<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| ExecError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> ExecResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ExecError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Headers for the outgoing request: template headers, then auth,
/// user agent and cookies, each replacing any earlier value.
fn outbound_headers(request: &Request) -> ExecResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        headers.insert(header_name(name)?, header_value(name, value)?);
    }
    if !request.auth.is_empty() {
        let name = if request.auth_header_name.is_empty() {
            DEFAULT_AUTH_HEADER
        } else {
            request.auth_header_name.as_str()
        };
        headers.insert(header_name(name)?, header_value(name, &request.auth)?);
    }
    if !request.user_agent.is_empty() {
        headers.insert(USER_AGENT, header_value("User-Agent", &request.user_agent)?);
    }
    if !request.cookies.is_empty() {
        let cookie = request
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        headers.insert(COOKIE, header_value("Cookie", &cookie)?);
    }
    Ok(headers)
}

/// One entry per header name, repeated values joined with `", "`.
///
/// Names are stored in canonical `Title-Case`.
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let name = canonical_header_name(name.as_str());
        let value = String::from_utf8_lossy(value.as_bytes());
        match flat.get_mut(&name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                flat.insert(name, value.into_owned());
            }
        }
    }
    flat
}

/// `content-type` -> `Content-Type`.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Expiry dates are kept in the IMF-fixdate form servers send them in.
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

fn captured_cookie(cookie: reqwest::cookie::Cookie<'_>) -> Cookie {
    Cookie {
        name: cookie.name().to_string(),
        value: cookie.value().to_string(),
        path: cookie.path().map(str::to_string),
        domain: cookie.domain().map(str::to_string),
        expires: cookie
            .expires()
            .map(|at| DateTime::<Utc>::from(at).format(COOKIE_DATE_FORMAT).to_string()),
        secure: cookie.secure(),
        http_only: cookie.http_only(),
    }
}
