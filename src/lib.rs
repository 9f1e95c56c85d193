//! # searchnet
//!
//! The networking layer of a browser-facing search UI.
//!
//! `searchnet` wraps a fetch-style HTTP transport with a request
//! multicasting and cancellation layer: concurrent identical requests
//! share a single network operation, "rolling" requests supersede and
//! cancel a stale in-flight request of the same shape, and callers of a
//! superseded request are transparently reattached to its replacement.
//!
//! ## Features
//!
//! - **Multicasting**: identical in-flight requests resolve from one
//!   network operation, each caller receiving an independently
//!   consumable copy of the payload
//! - **Rolling supersession**: cache-bypassing requests displace and
//!   abort a matching in-flight request instead of joining it
//! - **Cancellation recovery**: a request aborted by supersession
//!   re-resolves from its replacement rather than failing its callers
//! - **HTTP error normalization**: error-range statuses become typed
//!   errors carrying the method, target, and best-effort-parsed body
//! - **Search proxy**: a framework-neutral handler relaying paginated
//!   search queries to an upstream API with Basic auth
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use searchnet::Client;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::new();
//!     let response = client
//!         .get("https://api.example.com/search?q=rust")
//!         .send()
//!         .await
//!         .unwrap();
//!     println!("Status: {}", response.status());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Core types and error definitions
//! - [`client`] - High-level client and request builder
//! - [`restapi`] - Request lifecycle, multicast registry, and transport
//! - [`search`] - Search query shape and upstream proxy handler

pub mod base;
pub mod client;
pub mod restapi;
pub mod search;

pub use client::Client;
pub use restapi::request::ApiRequest;
