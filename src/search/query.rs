//! The paginated search query.

use serde::{Deserialize, Serialize};
use url::Url;

/// Results per page when the caller does not say.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Page number when the caller does not say.
pub const DEFAULT_PAGE: u32 = 1;

/// A repository search query as received from the browser.
///
/// Every field is optional on the wire; [`apply_to`](SearchQuery::apply_to)
/// fills the pagination defaults and passes text fields through as-is,
/// empty when absent, matching what the upstream API expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search terms.
    pub q: Option<String>,

    /// Sort key, e.g. `stars`.
    pub sort: Option<String>,

    /// Sort direction, `asc` or `desc`.
    pub order: Option<String>,

    /// Results per page.
    pub per_page: Option<u32>,

    /// 1-based page number.
    pub page: Option<u32>,
}

impl SearchQuery {
    /// Append this query's parameters to `url`.
    pub fn apply_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("q", self.q.as_deref().unwrap_or(""))
            .append_pair("sort", self.sort.as_deref().unwrap_or(""))
            .append_pair("order", self.order.as_deref().unwrap_or(""))
            .append_pair(
                "per_page",
                &self.per_page.unwrap_or(DEFAULT_PER_PAGE).to_string(),
            )
            .append_pair("page", &self.page.unwrap_or(DEFAULT_PAGE).to_string());
    }
}
