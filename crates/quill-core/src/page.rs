//! Pagination for owner-scoped listings

use crate::error::{CoreError, CoreResult};

/// Fixed page size for every listing.
pub const PAGE_SIZE: u64 = 20;

/// 1-based page selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest(u64);

impl PageRequest {
    /// Page 0 is rejected the same way as a page past the end.
    pub fn new(number: u64) -> CoreResult<Self> {
        if number == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(Self(number))
    }

    pub fn number(self) -> u64 {
        self.0
    }

    pub fn offset(self) -> u64 {
        (self.0 - 1) * PAGE_SIZE
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

/// One page of results plus enough context to emit prev/next markers.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matching rows before pagination.
    pub total: u64,
    /// The 1-based page these items came from.
    pub number: u64,
}

impl<T> Page<T> {
    pub fn next(&self) -> Option<u64> {
        (self.number < last_page(self.total)).then(|| self.number + 1)
    }

    pub fn previous(&self) -> Option<u64> {
        (self.number > 1).then(|| self.number - 1)
    }
}

/// Highest valid page number for a collection of `total` rows.
///
/// An empty collection still has page 1 (valid and empty).
pub fn last_page(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE).max(1)
}
