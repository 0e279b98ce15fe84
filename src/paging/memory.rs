//! In-process data source over a fixed item list.
//!
//! Used by the demo binary and tests. It can repeat items across page seams
//! the way drifting remote listings do, hand out cursor tokens, and fail
//! chosen pages.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::errors::FetchError;
use super::source::{DataSource, PageRequest, PageResponse};

const CURSOR_PREFIX: &str = "page:";

pub struct MemorySource<E> {
    items: Vec<E>,
    page_size: usize,
    /// Items from the previous page repeated at the start of each page
    overlap: usize,
    cursors: bool,
    failing_pages: HashSet<i32>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl<E: Clone> MemorySource<E> {
    pub fn new(items: Vec<E>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            overlap: 0,
            cursors: false,
            failing_pages: HashSet::new(),
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Hand out `prev`/`next` cursor tokens and honour them on requests
    pub fn with_cursors(mut self) -> Self {
        self.cursors = true;
        self
    }

    pub fn failing_on(mut self, page: i32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of fetches served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn page_count(&self) -> i32 {
        self.items.len().div_ceil(self.page_size) as i32
    }

    fn cursor_for(&self, page: i32) -> Option<String> {
        if self.cursors && page >= 0 && page < self.page_count() {
            Some(format!("{}{}", CURSOR_PREFIX, page))
        } else {
            None
        }
    }

    fn resolve_page(&self, request: &PageRequest) -> Result<i32, FetchError> {
        match (&request.cursor, self.cursors) {
            (Some(cursor), true) => cursor
                .strip_prefix(CURSOR_PREFIX)
                .and_then(|page| page.parse().ok())
                .ok_or_else(|| FetchError::Parse(format!("unknown cursor {}", cursor))),
            _ => Ok(request.page),
        }
    }

    fn slice(&self, page: i32) -> Vec<E> {
        if page < 0 || page >= self.page_count() {
            return Vec::new();
        }
        let page = page as usize;
        let mut start = page * self.page_size;
        if page > 0 {
            start = start.saturating_sub(self.overlap);
        }
        let end = ((page + 1) * self.page_size).min(self.items.len());
        self.items[start..end].to_vec()
    }
}

#[async_trait]
impl<E: Clone + Send + Sync> DataSource<E> for MemorySource<E> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse<E>, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let page = self.resolve_page(request)?;
        if self.failing_pages.contains(&page) {
            return Err(FetchError::Network(format!("page {} is unavailable", page)));
        }

        let response = PageResponse::new(self.slice(page), self.page_count(), page + 1)
            .with_cursors(self.cursor_for(page - 1), self.cursor_for(page + 1));
        Ok(response)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::source::TaskKind;

    fn request(page: i32, cursor: Option<&str>) -> PageRequest {
        PageRequest {
            task_id: 0,
            kind: TaskKind::Refresh,
            page,
            cursor: cursor.map(str::to_string),
            forward: true,
        }
    }

    #[tokio::test]
    async fn test_pages_and_overlap() {
        let source = MemorySource::new((0..25).collect::<Vec<u32>>(), 10).with_overlap(2);
        assert_eq!(source.page_count(), 3);

        let first = source.fetch_page(&request(0, None)).await.unwrap();
        assert_eq!(first.items, (0..10).collect::<Vec<_>>());
        assert_eq!(first.pages, 3);
        assert_eq!(first.next_page, 1);

        let last = source.fetch_page(&request(2, None)).await.unwrap();
        assert_eq!(last.items, (18..25).collect::<Vec<_>>());

        let beyond = source.fetch_page(&request(7, None)).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_cursors() {
        let source = MemorySource::new((0..30).collect::<Vec<u32>>(), 10).with_cursors();
        let middle = source.fetch_page(&request(0, Some("page:1"))).await.unwrap();
        assert_eq!(middle.items[0], 10);
        assert_eq!(middle.prev.as_deref(), Some("page:0"));
        assert_eq!(middle.next.as_deref(), Some("page:2"));

        let bad = source.fetch_page(&request(0, Some("yesterday"))).await;
        assert!(matches!(bad, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_failing_page() {
        let source = MemorySource::new(vec![1u32, 2, 3], 2).failing_on(1);
        assert!(source.fetch_page(&request(0, None)).await.is_ok());
        assert!(matches!(
            source.fetch_page(&request(1, None)).await,
            Err(FetchError::Network(_))
        ));
    }
}
