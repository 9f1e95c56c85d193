//! The in-flight request table.
//!
//! The registry maps a request fingerprint to the [`ApiRequest`] that
//! currently owns the network operation for that shape. Lookups during
//! dispatch let identical requests join an existing operation; removal
//! is guarded by pointer identity so a finished request never evicts the
//! newer request that superseded it.

use std::sync::Arc;

use dashmap::DashMap;

use crate::restapi::request::ApiRequest;

/// Fingerprint-keyed table of in-flight requests.
#[derive(Default)]
pub struct MulticastRegistry {
    inflight: DashMap<String, Arc<ApiRequest>>,
}

impl MulticastRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        MulticastRegistry::default()
    }

    /// The request currently in flight for `fingerprint`, if any.
    pub fn lookup(&self, fingerprint: &str) -> Option<Arc<ApiRequest>> {
        self.inflight
            .get(fingerprint)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Record `request` as the in-flight owner of its fingerprint.
    ///
    /// Unconditional: a rolling request overwrites the entry of the
    /// request it is superseding.
    pub fn store(&self, request: &Arc<ApiRequest>) {
        self.inflight
            .insert(request.fingerprint().to_owned(), Arc::clone(request));
    }

    /// Remove the entry for `request` only if it is still the current
    /// owner of its fingerprint.
    ///
    /// A request that was superseded settles after its replacement has
    /// already taken over the slot; the identity check keeps the
    /// replacement registered.
    pub fn remove_if_current(&self, request: &Arc<ApiRequest>) {
        self.inflight
            .remove_if(request.fingerprint(), |_, current| {
                Arc::ptr_eq(current, request)
            });
    }

    /// Number of requests currently tracked.
    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    /// True when nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }
}
