//! Search query shape and upstream proxy handler.
//!
//! - [`query`]: the paginated search query and its URL encoding
//! - [`proxy`]: a framework-neutral handler relaying queries upstream

pub mod proxy;
pub mod query;

pub use proxy::{Credentials, SearchProxy};
pub use query::SearchQuery;
