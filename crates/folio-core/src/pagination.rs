//! Offset pagination shared by every listing.

/// Upper bound on page size.
pub const MAX_PAGE_SIZE: u64 = 100;
/// Upper bound on the page number, so offsets always fit a signed 64-bit
/// SQL parameter.
pub const MAX_PAGE: u64 = 1_000_000;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Clamp raw query values; missing values fall back to page 1 and
    /// `default_limit`.
    pub fn new(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Slice an already ordered, fully materialized result set.
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect();
        Page::new(items, total, *self)
    }
}

/// One page of results plus the size of the full result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    pub fn pages(&self) -> u64 {
        self.total.div_ceil(self.request.limit)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_raw_values() {
        assert_eq!(
            PageRequest::new(Some(0), Some(1000), 10),
            PageRequest { page: 1, limit: 100 }
        );
        assert_eq!(
            PageRequest::new(None, Some(0), 10),
            PageRequest { page: 1, limit: 1 }
        );
        assert_eq!(PageRequest::new(None, None, 20).limit, 20);
    }

    #[test]
    fn slices_and_counts_pages() {
        let request = PageRequest::new(Some(3), Some(4), 10);
        let page = request.slice((0..10).collect::<Vec<_>>());
        assert_eq!(page.items, vec![8, 9]);
        assert_eq!(page.total, 10);
        assert_eq!(page.pages(), 3);
    }

    #[test]
    fn huge_page_numbers_keep_offsets_in_sql_range() {
        let request = PageRequest::new(Some(u64::MAX), Some(100), 10);
        assert_eq!(request.page, MAX_PAGE);
        assert!(i64::try_from(request.offset()).is_ok());
        assert!(request.slice(vec![1, 2, 3]).items.is_empty());
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page = PageRequest::new(None, None, 10).slice(Vec::<u8>::new());
        assert_eq!(page.pages(), 0);
    }
}
