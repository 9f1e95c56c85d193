//! Framework-neutral search proxy.
//!
//! Relays a [`SearchQuery`] to an upstream search API and folds the
//! outcome into a plain `http::Response<Bytes>` a server framework can
//! ship as-is. Because each call goes through the shared [`Client`],
//! concurrent identical queries collapse into one upstream operation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode};
use url::Url;

use crate::base::NetError;
use crate::client::Client;
use crate::restapi::request::RequestOptions;
use crate::search::query::SearchQuery;

/// Environment variable holding the upstream client id.
pub const CLIENT_ID_VAR: &str = "GITHUB_CLIENT_ID";

/// Environment variable holding the upstream client secret.
pub const CLIENT_SECRET_VAR: &str = "GITHUB_CLIENT_SECRET";

/// Basic-auth credentials for the upstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Build credentials from an explicit id/secret pair.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Credentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read credentials from `GITHUB_CLIENT_ID` and
    /// `GITHUB_CLIENT_SECRET`, if both are set.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var(CLIENT_ID_VAR).ok()?;
        let client_secret = std::env::var(CLIENT_SECRET_VAR).ok()?;
        Some(Credentials::new(client_id, client_secret))
    }

    /// Render the `Authorization: Basic` header value.
    pub fn authorization(&self) -> Result<HeaderValue, NetError> {
        let token = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|err| NetError::InvalidHeader(err.to_string()))
    }
}

/// Proxy handler relaying search queries to an upstream endpoint.
pub struct SearchProxy {
    client: Client,
    endpoint: Url,
    credentials: Option<Credentials>,
}

impl SearchProxy {
    /// Build a proxy against `endpoint`, without authentication.
    pub fn new(client: Client, endpoint: Url) -> Self {
        SearchProxy {
            client,
            endpoint,
            credentials: None,
        }
    }

    /// Attach Basic-auth credentials to every upstream request.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Relay `query` upstream and fold the outcome into a response.
    ///
    /// - success: `200` with the upstream JSON payload
    /// - error-range upstream status: that status with the structured
    ///   error body
    /// - anything else (transport failure, unparseable success body):
    ///   `503` with an empty body
    pub async fn handle(&self, query: &SearchQuery) -> http::Response<Bytes> {
        let mut url = self.endpoint.clone();
        query.apply_to(&mut url);

        let mut options = RequestOptions {
            method: Method::GET,
            ..RequestOptions::default()
        };
        if let Some(credentials) = &self.credentials {
            match credentials.authorization() {
                Ok(value) => {
                    options.headers.insert(AUTHORIZATION, value);
                }
                Err(err) => {
                    tracing::debug!(error = %err, "credentials could not be rendered");
                    return json_response(StatusCode::SERVICE_UNAVAILABLE, Bytes::new());
                }
            }
        }

        let request = match self.client.create(url.as_str(), options) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(error = %err, "search request could not be created");
                return json_response(StatusCode::SERVICE_UNAVAILABLE, Bytes::new());
            }
        };

        let outcome = async {
            request.run()?;
            request.response().await
        }
        .await;

        match outcome {
            Ok(response) => {
                if request.parse_json() && response.json::<serde_json::Value>().is_err() {
                    tracing::debug!(url = %url, "upstream success body was not JSON");
                    return json_response(StatusCode::SERVICE_UNAVAILABLE, Bytes::new());
                }
                json_response(StatusCode::OK, response.bytes().clone())
            }
            Err(err) => match err.as_status_error() {
                Some(status_err) => {
                    let body = if status_err.body.is_some() {
                        // Already valid JSON; relay the original bytes so
                        // key order survives.
                        Bytes::from(status_err.body_text.clone().into_bytes())
                    } else {
                        Bytes::from(
                            serde_json::json!({ "message": status_err.body_text }).to_string(),
                        )
                    };
                    let status = if status_err.status.is_client_error()
                        || status_err.status.is_server_error()
                    {
                        status_err.status
                    } else {
                        StatusCode::UNPROCESSABLE_ENTITY
                    };
                    json_response(status, body)
                }
                None => {
                    tracing::debug!(error = %err, url = %url, "search relay failed");
                    json_response(StatusCode::SERVICE_UNAVAILABLE, Bytes::new())
                }
            },
        }
    }
}

fn json_response(status: StatusCode, body: Bytes) -> http::Response<Bytes> {
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_is_basic_base64() {
        let credentials = Credentials::new("id", "secret");
        let value = credentials.authorization().unwrap();
        assert_eq!(value, "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn json_response_sets_content_type() {
        let response = json_response(StatusCode::OK, Bytes::from_static(b"{}"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }
}
