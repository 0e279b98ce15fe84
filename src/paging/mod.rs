//! Windowed pagination of remote lists.
//!
//! [`PaginatedListController`] keeps a contiguous window of pages in memory
//! and merges forward, backward and random-access loads into it.
//! [`Pager`] drives a controller against an async [`DataSource`].

pub mod controller;
pub mod driver;
pub mod duplicates;
pub mod errors;
pub mod memory;
pub mod observer;
pub mod page_index;
pub mod snapshot;
pub mod source;
pub mod surface;
pub mod task_id;

pub use controller::{Completion, DuplicateFn, PaginatedListController};
pub use driver::Pager;
pub use duplicates::{drop_leading_duplicates, drop_trailing_duplicates, seam_window, CHECK_DUPLICATE_RANGE};
pub use errors::{FetchError, PagingError, PagingResult};
pub use memory::MemorySource;
pub use observer::{DataObserver, NoopObserver};
pub use page_index::PageIndex;
pub use snapshot::ControllerSnapshot;
pub use source::{DataSource, PageRequest, PageResponse, Task, TaskKind};
pub use surface::{ListSurface, LoadProgress, RecordingSurface, ShownState, SurfaceEvent, TracingSurface};
pub use task_id::TaskIdGenerator;
