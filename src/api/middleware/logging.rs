//! Request/response logging middleware with sensitive data redaction

use std::sync::LazyLock;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use regex::Regex;
use tracing::{debug, info, Level};

use crate::api::types::ApiError;

/// Request bodies above this size are never buffered for logging
const MAX_LOGGED_BODY_BYTES: usize = 16 * 1024;
const MAX_LOGGED_BODY_CHARS: usize = 512;

const SENSITIVE_FIELDS: &[&str] = &["password", "secret", "token", "cookie", "authorization"];

/// Matches `"<field>": "<string value>"`, honoring escaped quotes in the value
static SENSITIVE_FIELD_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let fields = SENSITIVE_FIELDS.join("|");
    Regex::new(&format!(r#"(?i)"({})"\s*:\s*"(?:[^"\\]|\\.)*""#, fields)).ok()
});

/// Middleware to log HTTP requests and responses with sensitive data redaction.
/// Note: This middleware does NOT create its own tracing span since `TraceLayer`
/// from tower-http already handles span creation.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = extract_path(&request);
    let request_id = extract_request_id(&request);

    let headers_log = redact_headers(&request);

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = %headers_log,
        "Incoming request"
    );

    let request = if tracing::enabled!(Level::DEBUG) && is_json(&request) && is_small(&request) {
        match log_json_body(request, &request_id).await {
            Ok(request) => request,
            Err(response) => return response,
        }
    } else {
        request
    };

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}

fn extract_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn extract_request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn is_json(request: &Request<Body>) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Whether the declared body length fits the logging buffer
///
/// Bodies without a `Content-Length` are streamed through unlogged.
fn is_small(request: &Request<Body>) -> bool {
    request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .is_some_and(|len| len <= MAX_LOGGED_BODY_BYTES)
}

/// Buffers a small JSON body, logs it with secrets masked and puts it back
async fn log_json_body(request: Request<Body>, request_id: &str) -> Result<Request<Body>, Response> {
    let (parts, body) = request.into_parts();

    let bytes = axum::body::to_bytes(body, MAX_LOGGED_BODY_BYTES)
        .await
        .map_err(|_| {
            ApiError::bad_request("Request body could not be read").into_response()
        })?;

    let text = String::from_utf8_lossy(&bytes);
    debug!(
        request_id = %request_id,
        body = %truncate_for_log(&redact_json_sensitive_fields(&text), MAX_LOGGED_BODY_CHARS),
        "Request body"
    );

    Ok(Request::from_parts(parts, Body::from(bytes)))
}

/// Redact sensitive headers for logging
fn redact_headers(request: &Request<Body>) -> String {
    let mut parts = Vec::new();

    for (name, value) in request.headers() {
        let name_str = name.as_str().to_lowercase();

        if !should_log_header(&name_str) {
            continue;
        }

        let value_str = if is_sensitive_header(&name_str) {
            "[REDACTED]".to_string()
        } else {
            value.to_str().unwrap_or("[invalid]").to_string()
        };

        parts.push(format!("{}={}", name_str, value_str));
    }

    parts.join(", ")
}

/// Check if a header contains sensitive information
fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization" | "cookie" | "set-cookie" | "proxy-authorization"
    )
}

/// Check if a header should be logged
fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "content-type"
            | "content-length"
            | "accept"
            | "origin"
            | "user-agent"
            | "x-request-id"
            | "x-forwarded-for"
            | "x-real-ip"
            | "authorization"
            | "cookie"
    )
}

/// Masks the string value of every sensitive field in a JSON document
pub fn redact_json_sensitive_fields(json: &str) -> String {
    match SENSITIVE_FIELD_PATTERN.as_ref() {
        Some(pattern) => pattern
            .replace_all(json, r#""$1": "[REDACTED]""#)
            .into_owned(),
        None => "[REDACTED BODY]".to_string(),
    }
}

/// Truncate long strings for logging
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        None => s.to_string(),
        Some((cut, _)) => format!(
            "{}...[truncated {} chars]",
            &s[..cut],
            s[cut..].chars().count()
        ),
    }
}
