//! Paged, sorted order listing types.

use serde::{Deserialize, Serialize};

/// Field an order listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    TotalAmount,
    Status,
}

/// Sort direction for an order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// A request for one page of an order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: usize,
    /// Page size; callers should keep this bounded.
    pub size: usize,
    pub sort_field: SortField,
    pub direction: SortDirection,
}

impl PageRequest {
    /// Creates a page request with default sorting (newest first).
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    /// Sets the sort field and direction.
    pub fn sorted_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_field = field;
        self.direction = direction;
        self
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: 20,
            sort_field: SortField::default(),
            direction: SortDirection::default(),
        }
    }
}

/// One page of results plus paging metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Builds a page by slicing a fully sorted result set.
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = all.len();
        let size = request.size.max(1);
        let total_pages = total_items.div_ceil(size);
        let items = all
            .into_iter()
            .skip(request.page * size)
            .take(size)
            .collect();
        Self {
            items,
            page: request.page,
            size,
            total_items,
            total_pages,
        }
    }
}
