//! The boundary between request orchestration and actual HTTP machinery.
//!
//! Everything above this module deals in [`TransportRequest`] and
//! [`ApiResponse`]; everything below it is swappable. Tests inject a
//! scripted transport, production uses [`HyperTransport`].

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use http::{HeaderMap, Method};
use http_body_util::Full;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::base::NetError;
use crate::restapi::response::ApiResponse;

/// The fully-resolved shape of one network operation.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,

    /// Absolute request URL.
    pub url: Url,

    /// Headers to send, already merged with baseline defaults.
    pub headers: HeaderMap,

    /// Request body, if any.
    pub body: Option<Bytes>,
}

/// A pluggable HTTP transport.
///
/// Implementations perform exactly one network operation per `fetch`
/// call and buffer the response. They know nothing about multicasting
/// or cancellation, which are layered above.
pub trait Transport: Send + Sync + 'static {
    /// Perform the operation described by `request`.
    fn fetch(&self, request: TransportRequest) -> BoxFuture<'static, Result<ApiResponse, NetError>>;
}

/// Production transport backed by hyper's pooled legacy client.
pub struct HyperTransport {
    client: HyperClient<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    /// Build a transport with a fresh connection pool.
    pub fn new() -> Self {
        HyperTransport {
            client: HyperClient::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        HyperTransport::new()
    }
}

impl Transport for HyperTransport {
    fn fetch(&self, request: TransportRequest) -> BoxFuture<'static, Result<ApiResponse, NetError>> {
        let client = self.client.clone();
        async move {
            let body = Full::new(request.body.unwrap_or_default());
            let mut builder = http::Request::builder()
                .method(request.method)
                .uri(request.url.as_str());
            if let Some(headers) = builder.headers_mut() {
                *headers = request.headers;
            }
            let hyper_request = builder
                .body(body)
                .map_err(|err| NetError::Transport(err.to_string()))?;
            let response = client
                .request(hyper_request)
                .await
                .map_err(|err| NetError::Transport(err.to_string()))?;
            ApiResponse::from_hyper(response).await
        }
        .boxed()
    }
}
