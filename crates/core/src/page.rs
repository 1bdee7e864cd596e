//! Pagination window and result types.

use serde::Serialize;

/// A validated pagination window.
///
/// `page` is always at least 1 and `limit` always within `1..=MAX_LIMIT`;
/// out-of-range numeric input is clamped into range rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u32,
    limit: u32,
}

impl PageWindow {
    /// Default page when the caller sends none.
    pub const DEFAULT_PAGE: u32 = 1;
    /// Default page size when the caller sends none.
    pub const DEFAULT_LIMIT: u32 = 10;
    /// Upper bound on the page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Build a window from raw listing parameters, clamping into range.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.unwrap_or(Self::DEFAULT_PAGE).max(1);
        let limit = limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        Self { page, limit }
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results with its pagination counters.
///
/// The counters derive from the unpaginated total, never from the length
/// of `items`, so a short final page still reports the full shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Assemble a page from fetched items, the request window, and the
    /// unpaginated total under the same filter.
    #[must_use]
    pub fn new(items: Vec<T>, window: PageWindow, total: i64) -> Self {
        let limit = i64::from(window.limit());
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        let page = window.page();

        Self {
            items,
            page,
            limit: window.limit(),
            total,
            total_pages,
            has_next: i64::from(page) < total_pages,
            has_prev: page > 1,
        }
    }

    /// Map the items while keeping the counters.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }

    /// The pagination counters alone, in wire form.
    #[must_use]
    pub const fn meta(&self) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

/// Pagination counters for the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}
