//! Error types for the paging controller and its data sources

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`DataSource`](super::DataSource) while fetching one page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum PagingError {
    #[error("Page count is {pages}, page is {page}")]
    IndexOutOfRange { page: i32, pages: i32 },

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PagingResult<T> = Result<T, PagingError>;
