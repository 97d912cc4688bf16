use serde::{Deserialize, Serialize};

/// Page 1 of every collection is its table of contents.
pub const FIRST_CONTENT_PAGE: u32 = 2;

/// Page count assumed when the pagination form can't be read.
pub const DEFAULT_TOTAL_PAGES: u32 = 10;

/// What the first page of a collection tells us about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub titleid: u32,
    /// Last page number found in the pagination form, if any.
    pub total_pages: Option<u32>,
}

/// Inclusive page range to visit in one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub first_page: u32,
    pub last_page: u32,
}

impl Pagination {
    /// Resolve the page range for a collection.
    ///
    /// Falls back to [`DEFAULT_TOTAL_PAGES`] when the total is unknown and
    /// clamps the last page to `max_pages` when given.
    pub fn resolve(info: &CollectionInfo, start_page: u32, max_pages: Option<u32>) -> Self {
        let total = info.total_pages.unwrap_or(DEFAULT_TOTAL_PAGES);
        let last_page = match max_pages {
            Some(max) => total.min(max),
            None => total,
        };
        Self {
            first_page: start_page,
            last_page,
        }
    }

    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        self.first_page..=self.last_page
    }

    pub fn is_empty(&self) -> bool {
        self.first_page > self.last_page
    }
}
