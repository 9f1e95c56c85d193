use crate::restapi::error::StatusError;
use http::StatusCode;
use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// Every variant is `Clone` so a settled outcome can be handed to any
/// number of multicast callers through a shared future.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetError {
    /// The network operation was aborted before settling.
    #[error("request was aborted")]
    Aborted,

    /// The transport failed before any HTTP response was received.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server responded with an error-range HTTP status.
    #[error(transparent)]
    HttpStatus(Box<StatusError>),

    /// Reading the response body failed.
    #[error("failed to read response body: {0}")]
    HttpBody(String),

    /// The response body was not valid UTF-8.
    #[error("response body was not valid UTF-8")]
    InvalidUtf8,

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The request target could not be parsed as a URL.
    #[error("invalid URL")]
    InvalidUrl,

    /// A header name or value could not be represented on the wire.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// `response()` was called before `run()`, so no operation exists yet.
    #[error("ApiRequest::response() called before ApiRequest::run(), so no operation exists yet")]
    NotStarted,

    /// `run()` was called twice on the same request.
    #[error("ApiRequest::run() called twice on the same request")]
    AlreadyStarted,
}

impl NetError {
    /// The HTTP status behind this error, if it carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            NetError::HttpStatus(err) => Some(err.status),
            _ => None,
        }
    }

    /// Borrow the normalized HTTP status error, if that is what this is.
    pub fn as_status_error(&self) -> Option<&StatusError> {
        match self {
            NetError::HttpStatus(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StatusError> for NetError {
    fn from(err: StatusError) -> Self {
        NetError::HttpStatus(Box::new(err))
    }
}
