//! Request lifecycle, multicast registry, and transport.
//!
//! This module implements the core of the crate: [`ApiRequest`] drives a
//! single logical network operation through its lifecycle, while
//! [`MulticastRegistry`] tracks in-flight requests by fingerprint so that
//! identical concurrent requests share one operation and rolling requests
//! can displace a stale one.
//!
//! - [`request`]: the request object, eligibility rules, and run loop
//! - [`multicast`]: the in-flight request table
//! - [`response`]: the buffered response handed to every caller
//! - [`transport`]: the boundary to the actual HTTP machinery
//! - [`error`]: normalized HTTP status errors
//!
//! [`ApiRequest`]: request::ApiRequest
//! [`MulticastRegistry`]: multicast::MulticastRegistry

pub mod error;
pub mod multicast;
pub mod request;
pub mod response;
pub mod transport;

pub use error::StatusError;
pub use multicast::MulticastRegistry;
pub use request::{ApiRequest, CacheMode, RequestOptions};
pub use response::ApiResponse;
pub use transport::{HyperTransport, Transport, TransportRequest};
