//! The request object and its run loop.
//!
//! An [`ApiRequest`] owns one logical network operation. Running it
//! consults the [`MulticastRegistry`]: an identical in-flight request is
//! joined instead of duplicated, and a rolling request displaces and
//! aborts the in-flight request it matches. A request aborted by
//! supersession re-resolves from its replacement, so its callers never
//! observe the cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::future::{AbortHandle, AbortRegistration, Abortable, BoxFuture, Shared};
use futures::FutureExt;
use http::{header, HeaderMap, HeaderValue, Method};
use once_cell::sync::OnceCell;
use url::Url;

use crate::base::{LoadState, NetError};
use crate::restapi::error::StatusError;
use crate::restapi::multicast::MulticastRegistry;
use crate::restapi::response::ApiResponse;
use crate::restapi::transport::{Transport, TransportRequest};

/// The settled outcome of a network operation.
pub type FetchOutcome = Result<ApiResponse, NetError>;

/// A multicast-capable handle on a pending network operation.
///
/// Cloning the handle gives another caller an independent await on the
/// same operation; the settled outcome is cloned to every caller.
pub type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// Fetch-style cache directive attached to a request.
///
/// Only [`NoStore`](CacheMode::NoStore) and [`Reload`](CacheMode::Reload)
/// change dispatch behavior here: both mark the request as rolling, so it
/// supersedes a matching in-flight request instead of joining it. The
/// full set is carried through to the transport untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Standard cache behavior.
    #[default]
    Default,

    /// Bypass the cache entirely, and do not store the response.
    NoStore,

    /// Bypass the cache for the request, but store the response.
    Reload,

    /// Revalidate with the origin before using a cached response.
    NoCache,

    /// Use the cache even if stale.
    ForceCache,
}

/// Caller-supplied knobs for a single request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method. Defaults to `GET`.
    pub method: Method,

    /// Extra headers, merged over the JSON baseline.
    pub headers: HeaderMap,

    /// Request body, if any.
    pub body: Option<Bytes>,

    /// Cache directive. `NoStore` and `Reload` make the request rolling.
    pub cache: CacheMode,

    /// Explicit multicast override. `None` applies the built-in
    /// heuristic, which only exempts `POST` requests carrying a body.
    pub multicast: Option<bool>,

    /// Whether consumers intend to parse the response as JSON.
    pub parse_json: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            cache: CacheMode::Default,
            multicast: None,
            parse_json: true,
        }
    }
}

/// Append caller headers after the fixed JSON request baseline.
///
/// The baseline `Content-Type`/`Accept` pair is fixed; caller entries
/// under those names are dropped, everything else is appended with
/// multi-valued entries preserved.
fn with_default_headers(extra: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        if name != header::CONTENT_TYPE && name != header::ACCEPT {
            headers.append(name, value.clone());
        }
    }
    headers
}

/// One logical network operation with multicast and cancellation hooks.
///
/// Requests are reference counted and compared by pointer identity; the
/// registry entry for a fingerprint is "the `Arc` that currently owns
/// the operation", never a value comparison.
pub struct ApiRequest {
    target: Url,
    method: Method,
    headers: HeaderMap,
    body: Option<Bytes>,
    cache: CacheMode,
    multicast: Option<bool>,
    parse_json: bool,
    registry: Arc<MulticastRegistry>,
    transport: Arc<dyn Transport>,
    abort_handle: AbortHandle,
    abort_registration: Mutex<Option<AbortRegistration>>,
    aborted: AtomicBool,
    fingerprint: OnceCell<String>,
    outcome: OnceCell<SharedFetch>,
}

impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("cache", &self.cache)
            .field("multicast", &self.multicast)
            .field("parse_json", &self.parse_json)
            .field("aborted", &self.aborted)
            .field("fingerprint", &self.fingerprint.get())
            .finish_non_exhaustive()
    }
}

impl ApiRequest {
    /// Construct a request against `target` with the given options.
    pub fn new(
        target: Url,
        options: RequestOptions,
        registry: Arc<MulticastRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Arc<Self> {
        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        Arc::new(ApiRequest {
            headers: with_default_headers(&options.headers),
            target,
            method: options.method,
            body: options.body,
            cache: options.cache,
            multicast: options.multicast,
            parse_json: options.parse_json,
            registry,
            transport,
            abort_handle,
            abort_registration: Mutex::new(Some(abort_registration)),
            aborted: AtomicBool::new(false),
            fingerprint: OnceCell::new(),
            outcome: OnceCell::new(),
        })
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target.
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// The merged headers this request will send.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The cache directive attached to this request.
    pub fn cache_mode(&self) -> CacheMode {
        self.cache
    }

    /// Whether consumers intend to parse the response as JSON.
    pub fn parse_json(&self) -> bool {
        self.parse_json
    }

    /// The identity key used for multicast matching.
    ///
    /// Two requests with equal fingerprints describe the same network
    /// operation. The body only participates when non-empty, so a `GET`
    /// and a body-less `POST` to the same target still differ through
    /// the method component.
    pub fn fingerprint(&self) -> &str {
        self.fingerprint.get_or_init(|| {
            let mut fp = format!("{}|||{}", self.method, self.target);
            if let Some(body) = &self.body {
                if !body.is_empty() {
                    fp.push_str("|||");
                    fp.push_str(&String::from_utf8_lossy(body));
                }
            }
            fp
        })
    }

    fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|body| !body.is_empty())
    }

    /// Whether this request participates in multicasting.
    ///
    /// An explicit override always wins. Otherwise only a `POST`
    /// carrying a body is exempt, on the assumption that such requests
    /// are mutations whose duplicates must each reach the server.
    pub fn is_multicastable(&self) -> bool {
        match self.multicast {
            Some(explicit) => explicit,
            None => !(self.method == Method::POST && self.has_body()),
        }
    }

    /// Whether this request displaces a matching in-flight request
    /// instead of joining it.
    pub fn is_rolling(&self) -> bool {
        matches!(self.cache, CacheMode::NoStore | CacheMode::Reload)
    }

    /// Dispatch the request.
    ///
    /// For a multicastable request this consults the registry: a
    /// matching in-flight request is joined unless this request is
    /// rolling, in which case the match is displaced and aborted after
    /// this request has been registered as its replacement.
    ///
    /// Returns [`NetError::AlreadyStarted`] on a second call.
    pub fn run(self: &Arc<Self>) -> Result<(), NetError> {
        let registration = {
            let mut slot = self
                .abort_registration
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            slot.take().ok_or(NetError::AlreadyStarted)?
        };

        if !self.is_multicastable() {
            let shared = self.bare_fetch(registration).shared();
            let _ = self.outcome.set(shared.clone());
            tokio::spawn(shared.map(|_| ()));
            return Ok(());
        }

        let existing = self.registry.lookup(self.fingerprint());
        let rolling = self.is_rolling();

        if let Some(existing) = existing.as_ref() {
            if !rolling {
                // An entry whose outcome is not yet published belongs to
                // a request still inside run(); treat it as absent.
                if let Some(outcome) = existing.outcome_handle() {
                    tracing::debug!(fingerprint = %self.fingerprint(), "joining in-flight request");
                    let _ = self.outcome.set(outcome);
                    return Ok(());
                }
            }
        }

        // Publish the outcome and the registry entry before aborting the
        // superseded request, so its recovery path can find us.
        let shared = self.multicast_fetch(registration).shared();
        let _ = self.outcome.set(shared.clone());
        self.registry.store(self);
        tokio::spawn(shared.map(|_| ()));

        if rolling {
            if let Some(existing) = existing {
                if !Arc::ptr_eq(&existing, self) {
                    tracing::debug!(fingerprint = %self.fingerprint(), "superseding in-flight request");
                    existing.abort();
                }
            }
        }

        Ok(())
    }

    /// Run the underlying operation once, with abort support and status
    /// normalization.
    fn bare_fetch(self: &Arc<Self>, registration: AbortRegistration) -> BoxFuture<'static, FetchOutcome> {
        let request = Arc::clone(self);
        async move {
            let operation = request.transport.fetch(TransportRequest {
                method: request.method.clone(),
                url: request.target.clone(),
                headers: request.headers.clone(),
                body: request.body.clone(),
            });
            let outcome = match Abortable::new(operation, registration).await {
                Ok(outcome) => outcome,
                Err(futures::future::Aborted) => Err(NetError::Aborted),
            };
            request.registry.remove_if_current(&request);
            let response = outcome?;
            if !response.ok() {
                let err =
                    StatusError::from_response(request.method.clone(), request.target.as_str(), &response);
                tracing::debug!(
                    status = %err.status,
                    url = %request.target,
                    "request settled with error status"
                );
                return Err(NetError::from(err));
            }
            Ok(response)
        }
        .boxed()
    }

    /// `bare_fetch` plus cancellation recovery.
    ///
    /// When the operation aborts and the registry holds a different
    /// request under the same fingerprint, this request was superseded
    /// and resolves from the replacement instead of failing.
    fn multicast_fetch(
        self: &Arc<Self>,
        registration: AbortRegistration,
    ) -> BoxFuture<'static, FetchOutcome> {
        let request = Arc::clone(self);
        let operation = self.bare_fetch(registration);
        async move {
            match operation.await {
                Err(NetError::Aborted) => {
                    let replacement = request.registry.lookup(request.fingerprint());
                    match replacement {
                        Some(replacement) if !Arc::ptr_eq(&replacement, &request) => {
                            match replacement.outcome_handle() {
                                Some(outcome) => {
                                    tracing::debug!(
                                        fingerprint = %request.fingerprint(),
                                        "reattaching to superseding request"
                                    );
                                    outcome.await
                                }
                                None => Err(NetError::Aborted),
                            }
                        }
                        _ => Err(NetError::Aborted),
                    }
                }
                settled => settled,
            }
        }
        .boxed()
    }

    /// Await the settled outcome of this request.
    ///
    /// Any number of callers may await concurrently; each receives an
    /// independent copy of the outcome. Returns
    /// [`NetError::NotStarted`] when `run()` has not been called.
    pub async fn response(&self) -> FetchOutcome {
        match self.outcome.get() {
            Some(shared) => shared.clone().await,
            None => Err(NetError::NotStarted),
        }
    }

    /// Abort the underlying operation.
    ///
    /// A no-op once the operation has settled.
    pub fn abort(&self) {
        tracing::debug!(url = %self.target, "aborting request");
        self.aborted.store(true, Ordering::SeqCst);
        self.abort_handle.abort();
    }

    /// True once `abort()` has been called on this request.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// The observable lifecycle state of this request.
    pub fn load_state(&self) -> LoadState {
        match self.outcome.get() {
            None => LoadState::Idle,
            Some(shared) => match shared.peek() {
                None => LoadState::Fetching,
                Some(Ok(_)) => LoadState::Complete,
                Some(Err(_)) => LoadState::Failed,
            },
        }
    }

    fn outcome_handle(&self) -> Option<SharedFetch> {
        self.outcome.get().cloned()
    }
}
