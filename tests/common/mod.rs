#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use http::{HeaderMap, StatusCode};
use tokio::sync::Semaphore;

use searchnet::base::NetError;
use searchnet::restapi::response::ApiResponse;
use searchnet::restapi::transport::{Transport, TransportRequest};
use searchnet::Client;

/// One scripted transport outcome, consumed in call order.
#[derive(Debug, Clone, Copy)]
pub enum MockReply {
    /// Respond with this status and body.
    Status(u16, &'static str),
    /// Fail with a transport error carrying this message.
    Error(&'static str),
}

/// A scripted transport for driving the request layer without a server.
///
/// The n-th `fetch` call receives the n-th reply. When gated, every call
/// blocks until a permit is released, which lets a test hold operations
/// in flight while it runs more requests against them.
pub struct MockTransport {
    replies: Vec<MockReply>,
    gate: Option<Arc<Semaphore>>,
    started: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<TransportRequest>>>,
}

impl MockTransport {
    pub fn new(replies: Vec<MockReply>) -> Arc<Self> {
        Arc::new(MockTransport {
            replies,
            gate: None,
            started: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// A transport whose calls block until [`release`](Self::release).
    pub fn gated(replies: Vec<MockReply>) -> Arc<Self> {
        Arc::new(MockTransport {
            replies,
            gate: Some(Arc::new(Semaphore::new(0))),
            started: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Let `n` gated calls proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of `fetch` calls made so far.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls that ran to completion.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Every request handed to the transport, in call order.
    pub fn seen(&self) -> Vec<TransportRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn fetch(&self, request: TransportRequest) -> BoxFuture<'static, Result<ApiResponse, NetError>> {
        let index = self.started.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request);
        let reply = self
            .replies
            .get(index)
            .copied()
            .unwrap_or(MockReply::Status(200, "{}"));
        let gate = self.gate.clone();
        let completed = Arc::clone(&self.completed);
        async move {
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            completed.fetch_add(1, Ordering::SeqCst);
            match reply {
                MockReply::Status(status, body) => Ok(ApiResponse::new(
                    StatusCode::from_u16(status).unwrap(),
                    HeaderMap::new(),
                    Bytes::from_static(body.as_bytes()),
                )),
                MockReply::Error(message) => Err(NetError::Transport(message.to_owned())),
            }
        }
        .boxed()
    }
}

/// A client wired to the given mock transport.
pub fn client_with(transport: Arc<MockTransport>) -> Client {
    Client::builder().transport(transport).build()
}
