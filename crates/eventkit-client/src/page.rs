//! Pagination metadata carried in list response headers.

use reqwest::header::{HeaderMap, CONTENT_RANGE, LINK};

/// Paging state of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// The `Link` header advertises a `rel="next"` page.
    pub next_page: bool,

    /// The `x/y` part of `Content-Range: items w-x/y`, or empty.
    pub range: String,
}

impl PageInfo {
    /// Read paging state from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let link = headers.get(LINK).and_then(|v| v.to_str().ok());
        let content_range = headers.get(CONTENT_RANGE).and_then(|v| v.to_str().ok());
        Self::parse(link, content_range)
    }

    /// Parse raw header values.
    pub fn parse(link: Option<&str>, content_range: Option<&str>) -> Self {
        let next_page = link
            .map(|l| l.split(',').any(|part| part.contains("rel=\"next\"")))
            .unwrap_or(false);

        // Second segment when split on '-', e.g. "items 1-12/34" -> "12/34".
        let range = content_range
            .and_then(|r| r.split('-').nth(1))
            .unwrap_or_default()
            .to_string();

        Self { next_page, range }
    }
}
