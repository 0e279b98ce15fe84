//! Paginated list controller for windowed remote lists.

pub mod config;
pub mod paging;

pub use config::PagerConfig;
pub use paging::*;
