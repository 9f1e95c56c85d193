//! HTTP client with builder pattern.
//!
//! Provides a high-level, ergonomic API for creating and dispatching
//! [`ApiRequest`]s. All requests created through one [`Client`] share a
//! single [`MulticastRegistry`] and transport, which is what makes
//! in-flight deduplication work across call sites.
//!
//! # Example
//!
//! ```rust,ignore
//! use searchnet::Client;
//!
//! let client = Client::new();
//!
//! let resp = client.get("https://api.example.com/search?q=rust")
//!     .send()
//!     .await?;
//! ```

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::Method;
use url::Url;

use crate::base::neterror::NetError;
use crate::restapi::multicast::MulticastRegistry;
use crate::restapi::request::{ApiRequest, CacheMode, RequestOptions};
use crate::restapi::response::ApiResponse;
use crate::restapi::transport::{HyperTransport, Transport};

/// Entry point for creating requests.
///
/// Cloning a client is cheap and clones share the same registry and
/// transport. Use [`Client::builder()`] to inject either.
#[derive(Clone)]
pub struct Client {
    registry: Arc<MulticastRegistry>,
    transport: Arc<dyn Transport>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a client with a fresh registry and the hyper transport.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(MulticastRegistry::new()),
            transport: Arc::new(HyperTransport::new()),
        }
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The registry tracking this client's in-flight requests.
    pub fn registry(&self) -> &Arc<MulticastRegistry> {
        &self.registry
    }

    /// Create a request from explicit options, without dispatching it.
    ///
    /// Returns [`NetError::InvalidUrl`] when `target` does not parse.
    pub fn create<U: AsRef<str>>(
        &self,
        target: U,
        options: RequestOptions,
    ) -> Result<Arc<ApiRequest>, NetError> {
        let url = Url::parse(target.as_ref()).map_err(|_| NetError::InvalidUrl)?;
        Ok(ApiRequest::new(
            url,
            options,
            Arc::clone(&self.registry),
            Arc::clone(&self.transport),
        ))
    }

    /// Start building a GET request.
    pub fn get<U: AsRef<str>>(&self, url: U) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Start building a POST request.
    pub fn post<U: AsRef<str>>(&self, url: U) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Start building a PUT request.
    pub fn put<U: AsRef<str>>(&self, url: U) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    /// Start building a DELETE request.
    pub fn delete<U: AsRef<str>>(&self, url: U) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    /// Start building a HEAD request.
    pub fn head<U: AsRef<str>>(&self, url: U) -> RequestBuilder {
        self.request(Method::HEAD, url)
    }

    /// Start building a PATCH request.
    pub fn patch<U: AsRef<str>>(&self, url: U) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    /// Start building a request with a custom method.
    pub fn request<U: AsRef<str>>(&self, method: Method, url: U) -> RequestBuilder {
        RequestBuilder {
            client: self.clone(),
            url: url.as_ref().to_owned(),
            options: RequestOptions {
                method,
                ..RequestOptions::default()
            },
        }
    }
}

/// Builder for configuring a client.
#[derive(Default)]
pub struct ClientBuilder {
    registry: Option<Arc<MulticastRegistry>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Share an existing registry instead of creating a fresh one.
    pub fn registry(mut self, registry: Arc<MulticastRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a custom transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Client {
        Client {
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(MulticastRegistry::new())),
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HyperTransport::new())),
        }
    }
}

/// Builder for a single request.
pub struct RequestBuilder {
    client: Client,
    url: String,
    options: RequestOptions,
}

impl RequestBuilder {
    /// Add a header. Invalid names or values are silently skipped.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        if let (Ok(name), Ok(value)) = (key.try_into(), value.try_into()) {
            self.options.headers.append(name, value);
        }
        self
    }

    /// Set the request body.
    pub fn body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.options.body = Some(body.into());
        self
    }

    /// Set a JSON body, serialized from `value`.
    #[cfg(feature = "json")]
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, NetError> {
        let body = serde_json::to_vec(value).map_err(|err| NetError::JsonParse(err.to_string()))?;
        self.options.body = Some(Bytes::from(body));
        Ok(self)
    }

    /// Set the cache directive. `NoStore` and `Reload` make the request
    /// rolling.
    pub fn cache_mode(mut self, cache: CacheMode) -> Self {
        self.options.cache = cache;
        self
    }

    /// Override the multicast eligibility heuristic.
    pub fn multicast(mut self, multicast: bool) -> Self {
        self.options.multicast = Some(multicast);
        self
    }

    /// Declare whether the response will be parsed as JSON.
    pub fn parse_json(mut self, parse_json: bool) -> Self {
        self.options.parse_json = parse_json;
        self
    }

    /// Build the request without dispatching it.
    pub fn build(self) -> Result<Arc<ApiRequest>, NetError> {
        self.client.create(&self.url, self.options)
    }

    /// Build, dispatch, and await the request.
    pub async fn send(self) -> Result<ApiResponse, NetError> {
        let request = self.build()?;
        request.run()?;
        request.response().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_invalid_urls() {
        let client = Client::new();
        let err = client
            .create("not a url", RequestOptions::default())
            .unwrap_err();
        assert_eq!(err, NetError::InvalidUrl);
    }

    #[test]
    fn builder_carries_method_and_headers() {
        let client = Client::new();
        let request = client
            .get("https://api.example.com/search")
            .header("x-trace", "abc")
            .header("bad header name\n", "v")
            .build()
            .unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.headers()["x-trace"], "abc");
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_body_marks_request_non_multicastable() {
        let client = Client::new();
        let request = client
            .post("https://api.example.com/items")
            .json(&serde_json::json!({"name": "x"}))
            .unwrap()
            .build()
            .unwrap();
        assert!(!request.is_multicastable());
    }

    #[test]
    fn clones_share_the_registry() {
        let client = Client::new();
        let clone = client.clone();
        assert!(Arc::ptr_eq(client.registry(), clone.registry()));
    }
}
