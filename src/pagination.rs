//! Page window over the visible rows.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 0-based page and page size. A `page_size` of 0 disables paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page: usize, page_size: usize) -> Self {
        Pagination { page, page_size }
    }

    /// Row range shown for `total` rows. A page past the end is empty.
    pub fn window(&self, total: usize) -> Range<usize> {
        if self.page_size == 0 {
            return 0..total;
        }
        let start = self.page.saturating_mul(self.page_size).min(total);
        let end = start.saturating_add(self.page_size).min(total);
        start..end
    }

    /// Number of pages needed for `total` rows (at least one).
    pub fn page_count(&self, total: usize) -> usize {
        if self.page_size == 0 {
            return 1;
        }
        total.div_ceil(self.page_size).max(1)
    }

    /// Page holding the row at visible position `position`.
    pub fn page_of(&self, position: usize) -> usize {
        if self.page_size == 0 {
            0
        } else {
            position / self.page_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window() {
        let p = Pagination::new(0, 25);
        assert_eq!(p.window(60), 0..25);
        assert_eq!(Pagination::new(2, 25).window(60), 50..60);
        assert_eq!(Pagination::new(3, 25).window(60), 60..60);
        assert_eq!(Pagination::new(usize::MAX, 25).window(60), 60..60);
    }

    #[test]
    fn test_zero_page_size_shows_everything() {
        let p = Pagination::new(4, 0);
        assert_eq!(p.window(7), 0..7);
        assert_eq!(p.page_count(7), 1);
        assert_eq!(p.page_of(6), 0);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(Pagination::new(0, 10).page_count(0), 1);
        assert_eq!(Pagination::new(0, 10).page_count(10), 1);
        assert_eq!(Pagination::new(0, 10).page_count(11), 2);
        assert_eq!(Pagination::new(0, 10).page_of(25), 2);
    }

    #[test]
    fn test_json_shape() {
        let p: Pagination = serde_json::from_str(r#"{"page": 1, "pageSize": 50}"#).unwrap();
        assert_eq!(p, Pagination::new(1, 50));
    }
}
