//! List-query parameters and sort resolution for the product catalog.
//!
//! Translating the loose query-string surface (`?page=2&sort=price-desc`)
//! into something the repository can execute happens here, so the SQL layer
//! only ever sees validated, typed inputs.

use rust_decimal::Decimal;
use serde::Deserialize;

use bramble_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Query parameters accepted by the product list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    /// Category ID filter.
    pub category: Option<i32>,
    pub active: Option<bool>,
    pub featured: Option<bool>,
    pub best_seller: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
    /// Explicit sort direction: `asc` or `desc`.
    pub order: Option<String>,
}

impl ProductListParams {
    /// The 1-based page, defaulting to 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// The page size, clamped to `[1, MAX_PAGE_SIZE]`.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// The trimmed search term, if a non-empty one was supplied.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Resolve `sort`/`order` into a typed key and direction.
    #[must_use]
    pub fn sort(&self) -> (SortKey, SortDir) {
        resolve_sort(self.sort.as_deref(), self.order.as_deref())
    }
}

/// Sortable product fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Price,
    Stock,
    CreatedAt,
}

impl SortKey {
    /// The SQL expression this key sorts by.
    ///
    /// Document fields are coalesced the same way normalization defaults
    /// them, so rows with missing fields sort as zero/empty rather than
    /// clustering as NULLs.
    #[must_use]
    pub const fn sql_expr(self) -> &'static str {
        match self {
            Self::Name => "COALESCE(doc->>'name', '')",
            Self::Price => "COALESCE((doc->>'price')::numeric, 0)",
            Self::Stock => "COALESCE((doc->>'stock')::bigint, 0)",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    #[must_use]
    pub const fn sql_keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Resolve a sort key and direction from the raw query parameters.
///
/// `price-desc` is a legacy alias meaning (price, descending) regardless of
/// the `order` parameter. Every other known key takes the explicit direction
/// (default ascending). Unknown or absent keys fall back to newest-first.
#[must_use]
pub fn resolve_sort(sort: Option<&str>, order: Option<&str>) -> (SortKey, SortDir) {
    let dir = if order == Some("desc") {
        SortDir::Desc
    } else {
        SortDir::Asc
    };

    match sort {
        Some("price-desc") => (SortKey::Price, SortDir::Desc),
        Some("price") => (SortKey::Price, dir),
        Some("name") => (SortKey::Name, dir),
        Some("stock") => (SortKey::Stock, dir),
        Some("createdAt" | "newest") => (SortKey::CreatedAt, dir),
        _ => (SortKey::CreatedAt, SortDir::Desc),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_desc_alias() {
        // The alias wins even against an explicit ascending order
        assert_eq!(
            resolve_sort(Some("price-desc"), Some("asc")),
            (SortKey::Price, SortDir::Desc)
        );
    }

    #[test]
    fn test_name_defaults_ascending() {
        assert_eq!(resolve_sort(Some("name"), None), (SortKey::Name, SortDir::Asc));
    }

    #[test]
    fn test_explicit_direction_passes_through() {
        assert_eq!(
            resolve_sort(Some("price"), Some("desc")),
            (SortKey::Price, SortDir::Desc)
        );
        assert_eq!(
            resolve_sort(Some("stock"), Some("asc")),
            (SortKey::Stock, SortDir::Asc)
        );
    }

    #[test]
    fn test_unknown_key_falls_back_to_newest() {
        assert_eq!(
            resolve_sort(Some("popularity"), Some("asc")),
            (SortKey::CreatedAt, SortDir::Desc)
        );
        assert_eq!(resolve_sort(None, None), (SortKey::CreatedAt, SortDir::Desc));
    }

    #[test]
    fn test_page_and_limit_defaults() {
        let params = ProductListParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_PAGE_SIZE);

        let params = ProductListParams {
            page: Some(0),
            limit: Some(10_000),
            ..ProductListParams::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_blank_search_ignored() {
        let params = ProductListParams {
            search: Some("   ".into()),
            ..ProductListParams::default()
        };
        assert!(params.search_term().is_none());

        let params = ProductListParams {
            search: Some(" mug ".into()),
            ..ProductListParams::default()
        };
        assert_eq!(params.search_term(), Some("mug"));
    }
}
