//! Pagination over the processed row set.

use std::ops::Range;

use serde::Serialize;

use crate::model::Row;

/// Rows per page when none is configured.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Width of the page navigation window when none is configured.
pub const DEFAULT_MAX_VISIBLE_PAGES: usize = 5;

/// Current page, page size and navigation window width.
///
/// Pages are 1-based. The page count is never stored; it is derived from the
/// row count handed to each call, so it cannot go stale.
///
/// # Example
///
/// ```
/// use gridline_lib::pipeline::Pagination;
///
/// let mut pagination = Pagination::new(2);
/// assert_eq!(pagination.total_pages(5), 3);
/// assert_eq!(pagination.set_page(10, 5), 3);
/// assert_eq!(pagination.range(5), 4..5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    per_page: usize,
    max_visible_pages: usize,
}

impl Pagination {
    /// Creates pagination on page 1 with the given page size.
    ///
    /// A page size of zero is treated as one.
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
        }
    }

    /// Sets the navigation window width (at least one).
    pub fn with_max_visible_pages(mut self, max: usize) -> Self {
        self.max_visible_pages = max.max(1);
        self
    }

    /// The current page as last set. Use [`current_page`](Self::current_page)
    /// for the value clamped to a row count.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Navigation window width.
    pub fn max_visible_pages(&self) -> usize {
        self.max_visible_pages
    }

    /// `max(1, ceil(row_count / per_page))`.
    pub fn total_pages(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.per_page).max(1)
    }

    /// The current page clamped into `[1, total_pages]`.
    pub fn current_page(&self, row_count: usize) -> usize {
        self.page.clamp(1, self.total_pages(row_count))
    }

    /// Moves to `page`, clamped into `[1, total_pages]`. Returns the new page.
    pub fn set_page(&mut self, page: i64, row_count: usize) -> usize {
        let total = self.total_pages(row_count) as i64;
        self.page = page.clamp(1, total) as usize;
        self.page
    }

    /// Changes the page size and re-clamps the current page.
    pub fn set_per_page(&mut self, per_page: usize, row_count: usize) -> usize {
        self.per_page = per_page.max(1);
        self.clamp(row_count)
    }

    /// Re-clamps the current page against a new row count.
    pub fn clamp(&mut self, row_count: usize) -> usize {
        self.page = self.current_page(row_count);
        self.page
    }

    /// Goes back to page 1.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Advances one page unless already on the last.
    pub fn next_page(&mut self, row_count: usize) -> usize {
        let current = self.current_page(row_count);
        if current < self.total_pages(row_count) {
            self.set_page(current as i64 + 1, row_count)
        } else {
            self.clamp(row_count)
        }
    }

    /// Goes back one page unless already on the first.
    pub fn prev_page(&mut self, row_count: usize) -> usize {
        let current = self.current_page(row_count);
        if current > 1 {
            self.set_page(current as i64 - 1, row_count)
        } else {
            self.clamp(row_count)
        }
    }

    /// Jumps to page 1.
    pub fn first_page(&mut self, row_count: usize) -> usize {
        self.set_page(1, row_count)
    }

    /// Jumps to the last page.
    pub fn last_page(&mut self, row_count: usize) -> usize {
        let last = self.total_pages(row_count) as i64;
        self.set_page(last, row_count)
    }

    /// Index range of the current page within `row_count` rows.
    pub fn range(&self, row_count: usize) -> Range<usize> {
        let start = (self.current_page(row_count) - 1) * self.per_page;
        let start = start.min(row_count);
        let end = (start + self.per_page).min(row_count);
        start..end
    }

    /// Slice of `items` on the current page.
    pub fn paginate<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    /// Page numbers to show in navigation.
    ///
    /// All pages when they fit in the window; otherwise a window of
    /// `max_visible_pages` centered on the current page, shifted to stay
    /// inside `[1, total_pages]`.
    pub fn visible_pages(&self, row_count: usize) -> Vec<usize> {
        let total = self.total_pages(row_count);
        let max = self.max_visible_pages;
        if total <= max {
            return (1..=total).collect();
        }

        let current = self.current_page(row_count);
        let half = max / 2;
        let mut start = current.saturating_sub(half).max(1);
        let end = (start + max - 1).min(total);
        if end == total {
            start = (end + 1).saturating_sub(max).max(1);
        }
        (start..=end).collect()
    }

    /// 1-based "showing start–end of total" figures for the current page.
    pub fn page_info(&self, row_count: usize) -> PageInfo {
        let range = self.range(row_count);
        PageInfo {
            start: if range.is_empty() { 0 } else { range.start + 1 },
            end: range.end,
            total: row_count,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

/// "Showing `start`–`end` of `total`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// First row shown, 1-based (0 when there are no rows).
    pub start: usize,
    /// Last row shown, 1-based.
    pub end: usize,
    /// Rows across all pages.
    pub total: usize,
}

/// A materialized page of rows with pagination information.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    rows: Vec<Row>,
    page: usize,
    per_page: usize,
    total: usize,
    total_pages: usize,
}

impl Page {
    /// Creates a page.
    pub fn new(rows: Vec<Row>, page: usize, per_page: usize, total: usize, total_pages: usize) -> Self {
        Self {
            rows,
            page,
            per_page,
            total,
            total_pages,
        }
    }

    /// Returns a reference to the rows on this page.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes the page and returns the rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// The 1-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Total rows across all pages.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of pages.
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows on this page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are pages after this one.
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}
