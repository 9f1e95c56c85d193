//! Buffered HTTP responses.
//!
//! Responses are fully buffered before being handed to callers. Because
//! the body is [`Bytes`], cloning a response is cheap and every caller of
//! a multicast request gets an independently consumable copy of the same
//! payload.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use serde::de::DeserializeOwned;

use crate::base::NetError;

/// A settled HTTP response with its body fully read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    /// Assemble a response from already-buffered parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        ApiResponse {
            status,
            version: Version::HTTP_11,
            headers,
            body,
        }
    }

    /// Drain a streaming hyper response into a buffered one.
    pub async fn from_hyper(response: http::Response<Incoming>) -> Result<Self, NetError> {
        let (parts, body) = response.into_parts();
        let collected = body
            .collect()
            .await
            .map_err(|err| NetError::HttpBody(err.to_string()))?;
        Ok(ApiResponse {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body: collected.to_bytes(),
        })
    }

    /// The response status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Canonical reason phrase for the status, empty when unknown.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or_default()
    }

    /// The HTTP version the response arrived over.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text.
    pub fn text(&self) -> Result<&str, NetError> {
        std::str::from_utf8(&self.body).map_err(|_| NetError::InvalidUtf8)
    }

    /// The body as text, replacing invalid UTF-8 sequences.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body).map_err(|err| NetError::JsonParse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn response(status: u16, body: &str) -> ApiResponse {
        let status = StatusCode::from_u16(status).unwrap();
        ApiResponse::new(status, HeaderMap::new(), Bytes::copy_from_slice(body.as_bytes()))
    }

    #[test]
    fn ok_tracks_success_range() {
        assert!(response(200, "").ok());
        assert!(response(204, "").ok());
        assert!(!response(404, "").ok());
        assert!(!response(500, "").ok());
    }

    #[test]
    fn clones_share_the_same_payload() {
        let original = response(200, r#"{"total_count":1}"#);
        let copy = original.clone();
        assert_eq!(original.bytes(), copy.bytes());
        let parsed: Value = copy.json().unwrap();
        assert_eq!(parsed["total_count"], 1);
    }

    #[test]
    fn invalid_utf8_is_typed() {
        let resp = ApiResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from_static(&[0xff, 0xfe]),
        );
        assert_eq!(resp.text(), Err(NetError::InvalidUtf8));
        assert_eq!(resp.text_lossy(), "\u{fffd}\u{fffd}");
    }

    #[test]
    fn json_error_is_typed() {
        let resp = response(200, "not json");
        let err = resp.json::<Value>().unwrap_err();
        assert!(matches!(err, NetError::JsonParse(_)));
    }
}
