//! Turning a template into an executable request.
//!
//! Resolution validates the URL and method, fills defaults and performs
//! placeholder substitution on the body. Nothing touches the store here.

use std::sync::OnceLock;

use regex::Regex;
use reqcorder_types::{Request, Template};
use reqwest::Url;
use tracing::debug;

use crate::error::ValidationError;

/// Methods a template may use.
pub const VALID_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];
/// Timeout applied when a template gives none, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;
pub const DEFAULT_USER_AGENT: &str = "ReqCorder";

fn env_placeholder() -> &'static Regex {
    static ENV: OnceLock<Regex> = OnceLock::new();
    ENV.get_or_init(|| {
        Regex::new(r"\{\{env:([A-Z_][A-Z0-9_]+)\}\}").expect("env placeholder pattern is valid")
    })
}

/// Resolve `template` against the process environment.
pub fn resolve(template: &Template) -> Result<Request, ValidationError> {
    resolve_with(template, |name| std::env::var(name).ok())
}

/// Resolve `template`, looking `{{env:NAME}}` placeholders up with `env`.
///
/// Unset variables substitute as the empty string.
pub fn resolve_with<F>(template: &Template, env: F) -> Result<Request, ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    validate_url(&template.url)?;
    let method = normalize_method(&template.method)?;

    let timeout = match template.timeout {
        Some(secs) if secs > 0.0 => secs,
        _ => DEFAULT_TIMEOUT_SECS,
    };
    let user_agent = if template.user_agent.is_empty() {
        DEFAULT_USER_AGENT.to_string()
    } else {
        template.user_agent.clone()
    };

    let body = substitute_env(&substitute_vars(template), env);
    let auth = prefixed_auth(&template.auth, &template.auth_type);

    debug!(%method, url = %template.url, timeout, "resolved template");
    Ok(Request {
        template_hash: None,
        url: template.url.clone(),
        method,
        headers: template.headers.clone(),
        cookies: template.cookies.clone(),
        auth,
        auth_type: template.auth_type.clone(),
        auth_header_name: template.auth_header_name.clone(),
        user_agent,
        body,
        timeout,
        ssl_verify: template.ssl_verify.unwrap_or(true),
        ca_cert_path: template.ca_cert_path.clone(),
    })
}

fn validate_url(raw: &str) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    Ok(())
}

fn normalize_method(raw: &str) -> Result<String, ValidationError> {
    let method = raw.trim().to_uppercase();
    if VALID_METHODS.contains(&method.as_str()) {
        Ok(method)
    } else {
        Err(ValidationError::InvalidMethod(raw.to_string()))
    }
}

fn substitute_vars(template: &Template) -> String {
    let mut body = template.body.clone();
    if body.is_empty() {
        return body;
    }
    for (key, value) in &template.body_vars {
        body = body.replace(&format!("{{{{{key}}}}}"), value);
    }
    body
}

fn substitute_env<F>(body: &str, env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env_placeholder()
        .replace_all(body, |caps: &regex::Captures<'_>| {
            let value = env(&caps[1]);
            debug!(var = &caps[1], found = value.is_some(), "substituting environment variable");
            value.unwrap_or_default()
        })
        .into_owned()
}

fn prefixed_auth(auth: &str, auth_type: &str) -> String {
    if auth.is_empty() {
        return String::new();
    }
    let prefix = match auth_type.to_lowercase().as_str() {
        "bearer" => "Bearer",
        "basic" => "Basic",
        _ => return auth.to_string(),
    };
    let lower = prefix.to_lowercase();
    if auth.starts_with(prefix) || auth.starts_with(&lower) {
        auth.to_string()
    } else {
        format!("{prefix} {auth}")
    }
}
