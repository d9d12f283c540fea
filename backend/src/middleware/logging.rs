use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_LENGTH, Request},
    middleware::Next,
    response::Response,
    Error as AxumError,
};
use std::time::Instant;

use crate::middleware::request_id::RequestId;

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;
const MAX_LOGGED_BODY_BYTES: usize = 2048;

/// Log target for requests refused by a compliance rule.
pub const REJECTION_LOG_TARGET: &str = "compliance_rejection";

/// Codes carried by 409 responses that represent an enforced rule rather
/// than a plain conflict.
const RULE_CODES: [&str; 4] = [
    "CAPACITY_EXCEEDED",
    "DUPLICATE_ACTIVE_RELATIONSHIP",
    "CUTOFF_VIOLATION",
    "INVALID_TRANSITION",
];

/// Logs every 4xx/5xx response together with its error code. Rule
/// rejections go to [`REJECTION_LOG_TARGET`] so audits can count them.
/// The body is buffered and forwarded unchanged.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let latency_ms = start.elapsed().as_millis() as u64;
    let (mut parts, body) = response.into_parts();
    match buffer_body(body).await {
        Ok(bytes) => {
            let event = ErrorEvent {
                status: status.as_u16(),
                method: &method,
                uri: &uri,
                request_id: &request_id,
                latency_ms,
            };
            log_error_event(&event, error_code(&bytes).as_deref(), &preview(&bytes));
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            parts.headers.remove(CONTENT_LENGTH);
            tracing::error!(
                status = status.as_u16(),
                method = %method,
                uri = %uri,
                request_id = %request_id,
                latency_ms,
                error = ?err,
                "Failed to read error response body"
            );
            Response::from_parts(parts, Body::empty())
        }
    }
}

struct ErrorEvent<'a> {
    status: u16,
    method: &'a str,
    uri: &'a str,
    request_id: &'a str,
    latency_ms: u64,
}

async fn buffer_body(body: Body) -> Result<Bytes, AxumError> {
    to_bytes(body, MAX_BUFFERED_BODY_BYTES).await
}

fn preview(bytes: &Bytes) -> String {
    if bytes.len() > MAX_LOGGED_BODY_BYTES {
        let slice = bytes.slice(0..MAX_LOGGED_BODY_BYTES);
        format!(
            "{}... (truncated, {} bytes total)",
            String::from_utf8_lossy(&slice),
            bytes.len()
        )
    } else {
        String::from_utf8_lossy(bytes).to_string()
    }
}

fn error_code(bytes: &Bytes) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()?
        .get("code")?
        .as_str()
        .map(str::to_string)
}

fn is_rule_rejection(code: Option<&str>) -> bool {
    code.is_some_and(|code| RULE_CODES.contains(&code))
}

fn log_error_event(event: &ErrorEvent<'_>, code: Option<&str>, body: &str) {
    let code = code.unwrap_or("-");
    if event.status >= 500 {
        tracing::error!(
            status = event.status,
            method = event.method,
            uri = event.uri,
            request_id = event.request_id,
            latency_ms = event.latency_ms,
            code,
            body,
            "Request completed with error status"
        );
    } else if is_rule_rejection(Some(code)) {
        tracing::info!(
            target: REJECTION_LOG_TARGET,
            status = event.status,
            method = event.method,
            uri = event.uri,
            request_id = event.request_id,
            code,
            body,
            "Request rejected by compliance rule"
        );
    } else {
        tracing::warn!(
            status = event.status,
            method = event.method,
            uri = event.uri,
            request_id = event.request_id,
            latency_ms = event.latency_ms,
            code,
            body,
            "Request completed with error status"
        );
    }
}
