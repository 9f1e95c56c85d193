//! Normalized errors for error-range HTTP responses.
//!
//! When a server answers with a 4xx or 5xx status, the raw response is
//! folded into a [`StatusError`] that keeps everything a caller might
//! want for diagnostics: the method and target that produced it, the
//! status line, the response headers, the body text, and the body parsed
//! as JSON when it is JSON.

use http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

use crate::restapi::response::ApiResponse;

/// An error-range HTTP response, normalized into a typed error.
///
/// The `message` field is promoted from the body's top-level `"message"`
/// string when the body is a JSON object carrying one, otherwise it is
/// the raw body text.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{method} {target} failed with status {status}: {message}")]
pub struct StatusError {
    /// HTTP method of the failed request.
    pub method: Method,

    /// Target URL of the failed request.
    pub target: String,

    /// The error-range status the server answered with.
    pub status: StatusCode,

    /// Canonical reason phrase for `status`, empty when unknown.
    pub status_text: String,

    /// Response headers as received.
    pub headers: HeaderMap,

    /// The response body decoded as text, lossily when not UTF-8.
    pub body_text: String,

    /// The body parsed as JSON, when it parses.
    pub body: Option<serde_json::Value>,

    /// Best-effort human-readable message extracted from the body.
    pub message: String,
}

impl StatusError {
    /// Build a `StatusError` from the raw pieces of a settled response.
    pub fn new(
        method: Method,
        target: String,
        status: StatusCode,
        headers: HeaderMap,
        body_text: String,
    ) -> Self {
        let body: Option<serde_json::Value> = serde_json::from_str(&body_text).ok();
        let message = body
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| body_text.clone());
        StatusError {
            method,
            target: target.clone(),
            status,
            status_text: status
                .canonical_reason()
                .unwrap_or_default()
                .to_owned(),
            headers,
            body_text,
            body,
            message,
        }
    }

    /// Normalize a buffered error-range response.
    pub fn from_response(method: Method, target: &str, response: &ApiResponse) -> Self {
        StatusError::new(
            method,
            target.to_owned(),
            response.status(),
            response.headers().clone(),
            response.text_lossy(),
        )
    }

    /// The extracted message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
