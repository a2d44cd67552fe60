//! Page position and size for paginated grids.

use serde::{Deserialize, Serialize};

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZES: [u32; 3] = [10, 50, 100];

/// Next entry of [`PAGE_SIZES`] after `current`, wrapping around.
pub fn next_page_size(current: u32) -> u32 {
    let index = PAGE_SIZES.iter().position(|s| *s == current);
    match index {
        Some(i) => PAGE_SIZES[(i + 1) % PAGE_SIZES.len()],
        None => PAGE_SIZES[0],
    }
}

/// Page navigation intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageNav {
    First,
    Prev,
    Next,
    Last,
}

/// `1 <= page <= total_pages` holds after every accepted fetch response.
///
/// `total_pages` only changes through [`Pagination::accept_total`]; local row
/// mutations never recompute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
    total_pages: u32,
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            total_pages: 1,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page a navigation intent lands on, clamped into `[1, total_pages]`.
    pub fn target(&self, nav: PageNav) -> u32 {
        match nav {
            PageNav::First => 1,
            PageNav::Prev => self.page.saturating_sub(1).max(1),
            PageNav::Next => self.page.saturating_add(1).min(self.total_pages),
            PageNav::Last => self.total_pages,
        }
    }

    pub(crate) fn set_page(&mut self, page: u32) {
        self.page = page.clamp(1, self.total_pages);
    }

    pub(crate) fn reset(&mut self) {
        self.page = 1;
    }

    /// Returns whether the limit changed.
    pub(crate) fn set_limit(&mut self, limit: u32) -> bool {
        let limit = limit.max(1);
        let changed = self.limit != limit;
        self.limit = limit;
        changed
    }

    /// Record the server's page count. Returns `true` when the current page
    /// was out of range and had to be clamped.
    pub(crate) fn accept_total(&mut self, total_pages: u32) -> bool {
        self.total_pages = total_pages.max(1);
        if self.page > self.total_pages {
            self.page = self.total_pages;
            true
        } else {
            false
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PAGE_SIZES[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(page: u32, total: u32) -> Pagination {
        let mut p = Pagination::new(10);
        p.accept_total(total);
        p.set_page(page);
        p
    }

    #[test]
    fn test_new_starts_on_first_page() {
        let p = Pagination::new(50);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 50);
        assert_eq!(p.total_pages(), 1);
        assert_eq!(Pagination::new(0).limit(), 1);
    }

    #[test]
    fn test_targets_clamp() {
        let p = at(1, 5);
        assert_eq!(p.target(PageNav::Prev), 1);
        assert_eq!(p.target(PageNav::Next), 2);
        assert_eq!(p.target(PageNav::Last), 5);

        let p = at(5, 5);
        assert_eq!(p.target(PageNav::Next), 5);
        assert_eq!(p.target(PageNav::First), 1);
    }

    #[test]
    fn test_accept_total_clamps_page() {
        let mut p = at(4, 5);
        assert!(p.accept_total(2));
        assert_eq!(p.page(), 2);
        assert!(p.accept_total(0));
        assert_eq!(p.total_pages(), 1);
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn test_next_page_size_cycles() {
        assert_eq!(next_page_size(10), 50);
        assert_eq!(next_page_size(50), 100);
        assert_eq!(next_page_size(100), 10);
        assert_eq!(next_page_size(7), 10);
    }
}
