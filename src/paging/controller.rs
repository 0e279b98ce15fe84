//! The paginated list controller.
//!
//! The controller owns the in-memory window of a remote paged list. Load
//! intents mint a task id and return a [`PageRequest`] for the caller to
//! execute; the result is fed back through [`on_page_data`] or
//! [`on_fetch_error`]. Completions whose task id is no longer current are
//! dropped, so issuing a new intent supersedes whatever was in flight.
//!
//! [`on_page_data`]: PaginatedListController::on_page_data
//! [`on_fetch_error`]: PaginatedListController::on_fetch_error

use tracing::{debug, error};

use super::duplicates::{drop_leading_duplicates, drop_trailing_duplicates, seam_window};
use super::errors::{FetchError, PagingError, PagingResult};
use super::observer::{DataObserver, NoopObserver};
use super::page_index::PageIndex;
use super::source::{PageRequest, PageResponse, Task, TaskKind};
use super::surface::{ListSurface, LoadProgress, ShownState};
use super::task_id::TaskIdGenerator;
use crate::config::PagerConfig;

/// Duplicate predicate supplied by the embedding application
pub type DuplicateFn<E> = Box<dyn Fn(&E, &E) -> bool + Send>;

/// Outcome of feeding a completion to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The completion belonged to the current task and was applied
    Applied,
    /// The task had been superseded; nothing changed
    Stale,
}

/// Windowed list of remote pages
pub struct PaginatedListController<E> {
    pub(super) config: PagerConfig,
    pub(super) items: Vec<E>,
    pub(super) index: PageIndex,
    /// Best known page count
    pub(super) pages: i32,
    /// Page the `next` cursor leads to
    pub(super) next_page: i32,
    pub(super) prev: Option<String>,
    pub(super) next: Option<String>,
    pub(super) state: ShownState,
    pub(super) id_generator: TaskIdGenerator,
    pub(super) current_task: Option<Task>,
    is_duplicate: DuplicateFn<E>,
    pub(super) surface: Box<dyn ListSurface<E>>,
    observer: Box<dyn DataObserver<E>>,
}

impl<E: 'static> PaginatedListController<E> {
    /// Create an empty controller in the `Loading` state; no request is issued
    pub fn new<S, F>(surface: S, is_duplicate: F, config: PagerConfig) -> Self
    where
        S: ListSurface<E> + 'static,
        F: Fn(&E, &E) -> bool + Send + 'static,
    {
        Self {
            config,
            items: Vec::new(),
            index: PageIndex::new(),
            pages: 0,
            next_page: 0,
            prev: None,
            next: None,
            state: ShownState::Loading,
            id_generator: TaskIdGenerator::new(),
            current_task: None,
            is_duplicate: Box::new(is_duplicate),
            surface: Box::new(surface),
            observer: Box::new(NoopObserver),
        }
    }

    /// Attach an observer notified of every item added or removed
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: DataObserver<E> + 'static,
    {
        self.observer = Box::new(observer);
        self
    }
}

impl<E> PaginatedListController<E> {
    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn item_at(&self, position: usize) -> Option<&E> {
        self.items.get(position)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page_index(&self) -> &PageIndex {
        &self.index
    }

    pub fn start_page(&self) -> i32 {
        self.index.start_page()
    }

    pub fn end_page(&self) -> i32 {
        self.index.end_page()
    }

    /// Best known total page count
    pub fn pages(&self) -> i32 {
        self.pages
    }

    pub fn next_page(&self) -> i32 {
        self.next_page
    }

    pub fn prev_token(&self) -> Option<&str> {
        self.prev.as_deref()
    }

    pub fn next_token(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn state(&self) -> &ShownState {
        &self.state
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn empty_message(&self) -> &str {
        &self.config.empty_message
    }

    /// Change the hint shown with an empty list; an empty view is updated in place
    pub fn set_empty_message(&mut self, message: impl Into<String>) {
        self.config.empty_message = message.into();
        if matches!(self.state, ShownState::Empty(_)) {
            self.show_empty();
        }
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn is_current_task(&self, task_id: u64) -> bool {
        self.current_task.as_ref().map(|task| task.id) == Some(task_id)
    }

    pub fn is_loading(&self) -> bool {
        self.current_task.is_some()
    }

    /// Page jumps only make sense while content is shown
    pub fn can_go_to(&self) -> bool {
        self.state.is_content()
    }

    /// Page of the first visible item
    pub fn page_for_top(&self) -> Option<i32> {
        let (first, _) = self.surface.visible_range()?;
        self.index.page_for_position(first)
    }

    /// Page of the last visible item
    pub fn page_for_bottom(&self) -> Option<i32> {
        let (_, last) = self.surface.visible_range()?;
        self.index.page_for_position(last)
    }

    pub fn first_visible_item(&self) -> Option<&E> {
        let (first, _) = self.surface.visible_range()?;
        self.items.get(first)
    }

    fn begin(&mut self, kind: TaskKind, page: i32, cursor: Option<String>, forward: bool) -> PageRequest {
        let id = self.id_generator.next_id();
        debug!(task_id = id, ?kind, page, ?cursor, "starting page load");
        self.current_task = Some(Task {
            id,
            kind: kind.clone(),
            page,
        });
        PageRequest {
            task_id: id,
            kind,
            page,
            cursor,
            forward,
        }
    }

    fn show(&mut self, state: ShownState) {
        if self.state != state {
            self.state = state;
            self.surface.on_state_changed(&self.state);
        }
    }

    fn show_empty(&mut self) {
        let message = self.config.empty_message.clone();
        self.show(ShownState::Empty(message));
    }

    /// Supersede the current task without issuing a new one
    pub fn cancel(&mut self) {
        let superseding = self.id_generator.next_id();
        if let Some(task) = self.current_task.take() {
            debug!(task_id = task.id, superseding, "cancelled page load");
        }
        self.surface.on_progress(LoadProgress::Idle);
        // a cancelled reload over held items leaves them on screen
        if self.state == ShownState::Loading && !self.items.is_empty() {
            self.show(ShownState::Content);
        }
    }

    /// Show the loading view and reload from page 0
    pub fn refresh(&mut self) -> PageRequest {
        self.show(ShownState::Loading);
        self.begin(TaskKind::Refresh, 0, None, true)
    }

    /// Pull-to-refresh: load the previous page, or reload if already at the top
    pub fn on_pull_refresh(&mut self) -> PageRequest {
        self.surface.on_progress(LoadProgress::Top);
        let start = self.index.start_page();
        if self.prev.is_some() || start > 0 {
            let cursor = self.prev.clone();
            self.begin(TaskKind::PrependKeepPosition, start - 1, cursor, false)
        } else {
            self.begin(TaskKind::Refresh, 0, None, true)
        }
    }

    /// The view cannot scroll further down.
    ///
    /// Unlike the other intents this never supersedes a load: while any task
    /// is in flight it returns `None` and the in-flight task keeps running.
    /// It also returns `None` when there is nothing left to fetch.
    pub fn on_reached_bottom(&mut self) -> Option<PageRequest> {
        if self.current_task.is_some() {
            return None;
        }

        if self.next.is_some() || self.index.end_page() < self.pages {
            self.surface.on_progress(LoadProgress::Bottom);
            self.fill_gap();
            let page = self.index.end_page();
            let cursor = self.next.clone();
            Some(self.begin(TaskKind::AppendKeepPosition, page, cursor, true))
        } else if self.index.start_page() > 0 && self.index.end_page() == self.pages {
            self.surface.on_progress(LoadProgress::Bottom);
            let page = self.index.end_page() - 1;
            Some(self.begin(TaskKind::RefreshPage, page, None, true))
        } else {
            None
        }
    }

    /// Append empty pages until the window reaches the page the next cursor points at
    fn fill_gap(&mut self) {
        while self.next_page > self.index.end_page() && self.index.end_page() < self.pages {
            debug!(page = self.index.end_page(), "filling skipped page");
            self.index.append_page(0);
        }
    }

    /// Navigate to `page`.
    ///
    /// Pages inside the window are scrolled to without a request; the pages
    /// adjacent to the window are prepended or appended; anything else
    /// reseeds the window.
    pub fn jump_to_page(&mut self, page: i32) -> PagingResult<Option<PageRequest>> {
        if page < 0 || page >= self.pages {
            return Err(PagingError::IndexOutOfRange {
                page,
                pages: self.pages,
            });
        }

        let start = self.index.start_page();
        let end = self.index.end_page();
        if let Some(position) = self.index.page_start(page) {
            self.cancel();
            self.surface.on_scroll_to(position, false);
            Ok(None)
        } else if page == start - 1 {
            self.surface.on_progress(LoadProgress::Top);
            Ok(Some(self.begin(TaskKind::PrependToTop, page, None, true)))
        } else if page == end {
            self.surface.on_progress(LoadProgress::Bottom);
            Ok(Some(self.begin(TaskKind::AppendToBottom, page, None, true)))
        } else {
            self.surface.on_progress(LoadProgress::Top);
            Ok(Some(self.begin(TaskKind::JumpToPage { page }, page, None, true)))
        }
    }

    /// Reseed the list from a raw cursor token
    pub fn jump_to_token(&mut self, token: Option<String>, is_next: bool) -> PageRequest {
        self.surface.on_progress(LoadProgress::Top);
        let kind = TaskKind::JumpToIndex {
            token: token.clone(),
            is_next,
        };
        self.begin(kind, 0, token, is_next)
    }

    /// Apply a successful fetch
    pub fn on_page_data(&mut self, task_id: u64, response: PageResponse<E>) -> Completion {
        if !self.is_current_task(task_id) {
            debug!(task_id, "discarding stale page data");
            return Completion::Stale;
        }
        let Some(task) = self.current_task.take() else {
            return Completion::Stale;
        };

        debug!(
            task_id,
            kind = ?task.kind,
            page = task.page,
            received = response.items.len(),
            "applying page data"
        );
        self.surface.on_progress(LoadProgress::Idle);

        match task.kind {
            TaskKind::Refresh | TaskKind::JumpToIndex { .. } => self.reseed(0, response),
            TaskKind::JumpToPage { page } => self.reseed(page, response),
            TaskKind::PrependKeepPosition => self.prepend(response, false),
            TaskKind::PrependToTop => self.prepend(response, true),
            TaskKind::AppendKeepPosition => self.append(response, false),
            TaskKind::AppendToBottom => self.append(response, true),
            TaskKind::RefreshPage => self.refresh_page(task.page, response),
        }
        Completion::Applied
    }

    /// Apply a failed fetch
    pub fn on_fetch_error(&mut self, task_id: u64, error: FetchError) -> Completion {
        if !self.is_current_task(task_id) {
            debug!(task_id, %error, "discarding stale fetch error");
            return Completion::Stale;
        }
        self.current_task = None;
        self.surface.on_progress(LoadProgress::Idle);

        let message = error.to_string();
        debug!(task_id, %message, "page load failed");
        if self.items.is_empty() {
            self.show(ShownState::Error(message));
        } else {
            self.show(ShownState::Content);
            self.surface.on_notice(&message);
        }
        Completion::Applied
    }

    fn reseed(&mut self, start_page: i32, response: PageResponse<E>) {
        let PageResponse {
            items,
            pages,
            next_page,
            prev,
            next,
        } = response;

        self.pages = pages;
        self.next_page = next_page;
        self.prev = prev;
        self.next = next;
        self.index.reset(start_page, items.len());

        self.items = items;
        self.observer.on_clear();
        if !self.items.is_empty() {
            self.observer.on_add(&self.items);
        }
        self.surface.on_reset(&self.items);

        if self.items.is_empty() {
            self.show_empty();
        } else {
            self.show(ShownState::Content);
            self.surface.on_scroll_to(0, false);
        }
    }

    fn prepend(&mut self, response: PageResponse<E>, to_top: bool) {
        let range = self.config.duplicate_check_range;
        let window = seam_window(&self.items, 0, range);
        let fresh = drop_trailing_duplicates(response.items, window, |a, b| (self.is_duplicate)(a, b));
        let count = fresh.len();

        self.index.prepend_page(count);
        self.pages = response.pages.max(self.index.end_page());
        self.prev = response.prev;

        if fresh.is_empty() {
            if self.items.is_empty() {
                self.show_empty();
            } else {
                self.show(ShownState::Content);
                if to_top {
                    self.surface.on_scroll_to(0, false);
                }
            }
            return;
        }

        self.observer.on_add(&fresh);
        let held = std::mem::replace(&mut self.items, fresh);
        self.items.extend(held);
        self.surface.on_insert_range(0, count);
        self.show(ShownState::Content);
        if to_top {
            self.surface.on_scroll_to(0, false);
        } else {
            // last prepended item sits right above what was visible before
            self.surface.on_scroll_to(count - 1, false);
        }
    }

    fn append(&mut self, response: PageResponse<E>, to_bottom: bool) {
        let range = self.config.duplicate_check_range;
        let old_len = self.items.len();
        let window = seam_window(&self.items, old_len, range);
        let fresh = drop_leading_duplicates(response.items, window, |a, b| (self.is_duplicate)(a, b));
        let count = fresh.len();

        self.index.append_page(count);
        self.next_page = response.next_page;
        self.pages = response.pages.max(self.index.end_page());
        self.next = response.next;

        if fresh.is_empty() {
            if self.items.is_empty() {
                self.show_empty();
            } else {
                self.show(ShownState::Content);
                if to_bottom {
                    self.surface.on_scroll_to(old_len - 1, false);
                }
            }
            return;
        }

        self.observer.on_add(&fresh);
        self.items.extend(fresh);
        self.surface.on_insert_range(old_len, count);
        self.show(ShownState::Content);
        if to_bottom {
            self.surface.on_scroll_to(old_len, false);
        } else {
            self.surface.on_scroll_by(self.config.next_page_scroll_step, true);
        }
    }

    fn refresh_page(&mut self, page: i32, response: PageResponse<E>) {
        let Some(old) = self.index.page_range(page) else {
            error!(
                page,
                start_page = self.index.start_page(),
                end_page = self.index.end_page(),
                "refreshed page is outside the window"
            );
            return;
        };

        if page == self.index.end_page() - 1 {
            self.next_page = response.next_page;
            self.next = response.next;
        }
        self.pages = response.pages.max(self.index.end_page());

        let removed: Vec<E> = self.items.drain(old.clone()).collect();
        if !removed.is_empty() {
            self.observer.on_remove(&removed);
            self.surface.on_remove_range(old.start, removed.len());
        }

        let range = self.config.duplicate_check_range;
        let window = seam_window(&self.items, old.start, range);
        let fresh = drop_leading_duplicates(response.items, window, |a, b| (self.is_duplicate)(a, b));
        let count = fresh.len();
        if count > 0 {
            self.observer.on_add(&fresh);
            let tail = self.items.split_off(old.start);
            self.items.extend(fresh);
            self.items.extend(tail);
            self.surface.on_insert_range(old.start, count);
        }
        self.index.replace_page(page, removed.len(), count);

        if self.items.is_empty() {
            self.show_empty();
            return;
        }
        self.show(ShownState::Content);
        let new_end = old.start + count;
        if new_end > old.end {
            self.surface.on_scroll_to(new_end - 1, false);
        }
    }
}
