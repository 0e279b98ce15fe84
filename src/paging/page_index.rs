//! Page dividers mapping page numbers to item ranges.
//!
//! If the window holds pages 3, 4 and 5 with 7, 8 and 9 items, the
//! dividers are `[7, 15, 24]` and `start_page` is 3.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::errors::{PagingError, PagingResult};

/// Cumulative item counts for the pages currently held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageIndex {
    /// `dividers[i]` is the item count through page `start_page + i`
    dividers: Vec<usize>,

    /// First page represented
    start_page: i32,

    /// Last page represented + 1
    end_page: i32,
}

impl PageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an index from raw parts, checking its invariants
    pub fn from_parts(dividers: Vec<usize>, start_page: i32, end_page: i32) -> PagingResult<Self> {
        if end_page < start_page {
            return Err(PagingError::CorruptSnapshot(format!(
                "end page {} is before start page {}",
                end_page, start_page
            )));
        }
        let span = end_page.checked_sub(start_page).ok_or_else(|| {
            PagingError::CorruptSnapshot(format!("page span {}..{} overflows", start_page, end_page))
        })?;
        if span as usize != dividers.len() {
            return Err(PagingError::CorruptSnapshot(format!(
                "{} dividers for pages {}..{}",
                dividers.len(),
                start_page,
                end_page
            )));
        }
        if dividers.windows(2).any(|w| w[0] > w[1]) {
            return Err(PagingError::CorruptSnapshot(
                "page dividers are not monotonic".to_string(),
            ));
        }
        Ok(Self {
            dividers,
            start_page,
            end_page,
        })
    }

    pub fn start_page(&self) -> i32 {
        self.start_page
    }

    pub fn end_page(&self) -> i32 {
        self.end_page
    }

    pub fn dividers(&self) -> &[usize] {
        &self.dividers
    }

    /// Number of pages represented
    pub fn len(&self) -> usize {
        self.dividers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dividers.is_empty()
    }

    /// Total number of items covered by the index
    pub fn total_items(&self) -> usize {
        self.dividers.last().copied().unwrap_or(0)
    }

    pub fn contains_page(&self, page: i32) -> bool {
        (self.start_page..self.end_page).contains(&page)
    }

    fn slot(&self, page: i32) -> Option<usize> {
        if self.contains_page(page) {
            Some((page - self.start_page) as usize)
        } else {
            None
        }
    }

    /// Offset of the first item of `page`, or `None` if the page is not held
    pub fn page_start(&self, page: i32) -> Option<usize> {
        let slot = self.slot(page)?;
        Some(if slot == 0 { 0 } else { self.dividers[slot - 1] })
    }

    /// Offset just past the last item of `page`
    pub fn page_end(&self, page: i32) -> Option<usize> {
        self.slot(page).map(|slot| self.dividers[slot])
    }

    pub fn page_range(&self, page: i32) -> Option<Range<usize>> {
        Some(self.page_start(page)?..self.page_end(page)?)
    }

    /// Item count of `page`; 0 for pages outside the window
    pub fn size_of_page(&self, page: i32) -> usize {
        self.page_range(page).map_or(0, |range| range.len())
    }

    /// Insert a new first page holding `count` items
    pub fn prepend_page(&mut self, count: usize) {
        for divider in &mut self.dividers {
            *divider += count;
        }
        self.dividers.insert(0, count);
        self.start_page -= 1;
    }

    /// Append a new last page holding `count` items
    pub fn append_page(&mut self, count: usize) {
        let total = self.total_items() + count;
        self.dividers.push(total);
        self.end_page += 1;
    }

    /// Adjust dividers after `page` had `old_count` items replaced by `new_count`.
    ///
    /// # Panics
    ///
    /// Panics if `page` is outside the window or `old_count` does not match
    /// the page's current size.
    pub fn replace_page(&mut self, page: i32, old_count: usize, new_count: usize) {
        let slot = self.slot(page).unwrap_or_else(|| {
            panic!(
                "replace_page({}) outside window {}..{}",
                page, self.start_page, self.end_page
            )
        });
        assert_eq!(
            self.size_of_page(page),
            old_count,
            "replace_page({}) with stale old count",
            page
        );
        for divider in &mut self.dividers[slot..] {
            *divider = *divider - old_count + new_count;
        }
    }

    /// Page holding the flat item `position`, if any
    pub fn page_for_position(&self, position: usize) -> Option<i32> {
        // dividers are sorted; the first divider strictly above position wins
        let slot = self.dividers.partition_point(|&divider| divider <= position);
        if slot < self.dividers.len() {
            Some(self.start_page + slot as i32)
        } else {
            None
        }
    }

    /// Reseed the index with a single page
    pub fn reset(&mut self, start_page: i32, count: usize) {
        self.dividers.clear();
        self.dividers.push(count);
        self.start_page = start_page;
        self.end_page = start_page + 1;
    }

    pub fn clear(&mut self) {
        self.dividers.clear();
        self.start_page = 0;
        self.end_page = 0;
    }
}
