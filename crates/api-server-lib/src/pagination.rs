//! Query-parameter parsing and response headers for paginated listings.

use api::page::{Page, PageRequest, SortOrder};
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::error::header_value;

pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
}

impl PageQuery {
    pub fn to_request(&self, default_size: i64) -> PageRequest {
        let sort = match self.sort.as_deref() {
            Some("id,desc") => SortOrder::IdDescending,
            _ => SortOrder::default(),
        };
        PageRequest::new(self.page.unwrap_or(0), self.size.unwrap_or(default_size), sort)
    }
}

/// `X-Total-Count` plus a `Link` header with first/last and, where they
/// exist, prev/next relations.
pub fn pagination_headers<T>(page: &Page<T>, request: &PageRequest, base: &str) -> HeaderMap {
    let size = request.size();
    let current = request.page();
    let last = (page.total_pages(size) - 1).max(0);

    let mut links = Vec::new();
    if current < last {
        links.push(link(base, current + 1, size, "next"));
    }
    if current > 0 {
        links.push(link(base, current - 1, size, "prev"));
    }
    links.push(link(base, last, size, "last"));
    links.push(link(base, 0, size, "first"));

    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, header_value(&page.total_count.to_string()));
    headers.insert("Link", header_value(&links.join(",")));
    headers
}

fn link(base: &str, page: i64, size: i64, rel: &str) -> String {
    format!("<{}?page={}&size={}>; rel=\"{}\"", base, page, size, rel)
}
