//! Data source contract and the request/response types exchanged with it

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::FetchError;

/// Kind of load a task performs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// Clear everything and seed from page 0
    Refresh,
    /// Load the page before the window, keeping the visible item in place
    PrependKeepPosition,
    /// Load the page before the window and scroll to its top
    PrependToTop,
    /// Load the page after the window, nudging the view down
    AppendKeepPosition,
    /// Load the page after the window and scroll to its first item
    AppendToBottom,
    /// Reload the last page in place
    RefreshPage,
    /// Reseed from a raw cursor token
    JumpToIndex { token: Option<String>, is_next: bool },
    /// Reseed at an arbitrary page
    JumpToPage { page: i32 },
}

/// One in-flight load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub kind: TaskKind,
    pub page: i32,
}

/// What the controller asks the data source to fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub task_id: u64,
    pub kind: TaskKind,
    /// Page number to fetch; approximate when a cursor is supplied
    pub page: i32,
    /// Opaque cursor to fetch from instead of the page number
    pub cursor: Option<String>,
    /// Whether the cursor points forward
    pub forward: bool,
}

/// One page as returned by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<E> {
    pub items: Vec<E>,
    /// Best known total page count
    pub pages: i32,
    /// Page number the `next` cursor leads to
    pub next_page: i32,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl<E> PageResponse<E> {
    /// A page-numbered response without cursors
    pub fn new(items: Vec<E>, pages: i32, next_page: i32) -> Self {
        Self {
            items,
            pages,
            next_page,
            prev: None,
            next: None,
        }
    }

    pub fn with_cursors(mut self, prev: Option<String>, next: Option<String>) -> Self {
        self.prev = prev;
        self.next = next;
        self
    }
}

/// Supplies one page of items at a time
#[async_trait]
pub trait DataSource<E>: Send + Sync {
    /// Fetch the page described by `request`
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse<E>, FetchError>;

    /// Source name used in logs
    fn name(&self) -> &str {
        "data-source"
    }
}
