//! Paginated list responses and the query parameters that produce them.

use serde::{Deserialize, Serialize};

/// One page of a server-side paginated list.
///
/// Matches the backend's `{items, total, page, size}` envelope. Missing
/// fields default to an empty first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 0,
            size: 0,
        }
    }
}

impl<T> Page<T> {
    /// Build a page from an unpaginated list.
    #[must_use]
    pub fn single(items: Vec<T>) -> Self {
        let len = items.len();
        Self {
            items,
            total: len as u64,
            page: 0,
            size: u32::try_from(len).unwrap_or(u32::MAX),
        }
    }

    /// Number of pages, `ceil(total / size)`. Zero when `size` is zero.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total.div_ceil(self.size as u64)
        }
    }

    /// Whether a page exists before this one.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// Whether a page exists after this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) + 1 < self.total_pages()
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Map the items, keeping pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}

/// Filter and pagination state for an admin list view.
///
/// Every reload re-sends the whole query; nothing is cached between loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Free-text search (`q`).
    pub q: Option<String>,
    /// Status filter (`estado`).
    pub status: Option<String>,
    /// Category filter (`categoria`).
    pub category: Option<String>,
    /// Zero-based page index.
    pub page: u32,
    /// Page size.
    pub size: u32,
}

impl ListQuery {
    /// Default admin page size.
    pub const DEFAULT_SIZE: u32 = 10;

    /// A first-page query with the given size and no filters.
    #[must_use]
    pub const fn with_size(size: u32) -> Self {
        Self {
            q: None,
            status: None,
            category: None,
            page: 0,
            size,
        }
    }

    /// Query parameters in wire order. Empty filters are omitted.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
        ];
        let filters = [
            ("q", &self.q),
            ("estado", &self.status),
            ("categoria", &self.category),
        ];
        for (key, value) in filters {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_owned()));
            }
        }
        pairs
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::with_size(Self::DEFAULT_SIZE)
    }
}
