//! Pagination types and arithmetic.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Upper bound on page size accepted from clients.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A single page of results plus the pagination metadata clients need to
/// render page controls.
///
/// Pages are 1-based. `total_pages` is never zero, even for an empty result
/// set, so pagination UI always has at least one page to point at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u32,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    /// Build a page from fetched items and the overall total.
    ///
    /// `page` is clamped into `[1, total_pages]`.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let total_pages = total_pages(total, limit);
        Self {
            items,
            total,
            total_pages,
            page: page.clamp(1, total_pages),
            limit,
        }
    }

    /// An empty page: `items: [], total: 0, total_pages: 1`.
    ///
    /// This is the degraded shape list handlers fall back to when the
    /// backing fetch fails, so rendering never sees a missing page.
    #[must_use]
    pub const fn empty(page: u32, limit: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            total_pages: 1,
            page: if page == 0 { 1 } else { page },
            limit,
        }
    }
}

/// `max(1, ceil(total / limit))`.
#[must_use]
pub const fn total_pages(total: u64, limit: u32) -> u32 {
    if total == 0 || limit == 0 {
        return 1;
    }
    let pages = total.div_ceil(limit as u64);
    if pages > u32::MAX as u64 {
        u32::MAX
    } else {
        pages as u32
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_exact_division() {
        assert_eq!(total_pages(24, 12), 2);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(25, 12), 3);
    }

    #[test]
    fn test_total_pages_minimum_one() {
        assert_eq!(total_pages(0, 12), 1);
        assert_eq!(total_pages(0, 1), 1);
    }

    #[test]
    fn test_page_clamps_page_number() {
        let page = Page::new(Vec::<i32>::new(), 25, 99, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);

        let page = Page::new(Vec::<i32>::new(), 25, 0, 12);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_page_accepts_in_range_page() {
        // getProducts({page: 2, limit: 12, total: 25}) -> totalPages 3, page 2
        let page = Page::new(vec![1, 2, 3], 25, 2, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn test_page_limit_clamped() {
        let page = Page::new(Vec::<i32>::new(), 10, 1, 0);
        assert_eq!(page.limit, 1);
        let page = Page::new(Vec::<i32>::new(), 10, 1, 10_000);
        assert_eq!(page.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_empty_shape() {
        let page = Page::<i32>::empty(1, 12);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let page = Page::new(vec![1], 1, 1, 12);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("totalPages").is_some());
        assert!(json.get("total_pages").is_none());
    }
}
