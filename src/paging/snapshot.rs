//! Save and restore of controller state across UI teardown.
//!
//! A snapshot owns the items by value; the host persists it with whatever
//! serde format its state mechanism uses. Restoring never issues a request.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::controller::PaginatedListController;
use super::errors::{PagingError, PagingResult};
use super::page_index::PageIndex;
use super::source::PageRequest;
use super::surface::{ListSurface, ShownState};
use crate::config::PagerConfig;

/// Full capture of a controller's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot<E> {
    pub items: Vec<E>,
    pub dividers: Vec<usize>,
    pub start_page: i32,
    pub end_page: i32,
    pub pages: i32,
    pub next_page: i32,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub state: ShownState,
    /// Next id the task generator will issue
    pub next_task_id: u64,
}

impl<E> ControllerSnapshot<E> {
    /// Check the page index invariants against the captured items
    pub fn validate(&self) -> PagingResult<PageIndex> {
        let index = PageIndex::from_parts(self.dividers.clone(), self.start_page, self.end_page)?;
        if index.total_items() != self.items.len() {
            return Err(PagingError::CorruptSnapshot(format!(
                "dividers cover {} items but {} were saved",
                index.total_items(),
                self.items.len()
            )));
        }
        Ok(index)
    }
}

impl<E> PaginatedListController<E> {
    /// Supersede an in-flight load before its state is read.
    ///
    /// With nothing loaded yet the pending load is kept, so the first page can
    /// still arrive. Otherwise the held items are what gets saved, shown as
    /// content.
    fn prepare_capture(&mut self) {
        if !self.items.is_empty() && self.is_loading() {
            self.cancel();
        }
    }

    fn snapshot_with(&self, items: Vec<E>) -> ControllerSnapshot<E> {
        ControllerSnapshot {
            items,
            dividers: self.index.dividers().to_vec(),
            start_page: self.index.start_page(),
            end_page: self.index.end_page(),
            pages: self.pages,
            next_page: self.next_page,
            prev: self.prev.clone(),
            next: self.next.clone(),
            state: self.state.clone(),
            next_task_id: self.id_generator.current_id(),
        }
    }

    /// Capture the current state, keeping the controller usable
    pub fn capture(&mut self) -> ControllerSnapshot<E>
    where
        E: Clone,
    {
        self.prepare_capture();
        self.snapshot_with(self.items.clone())
    }

    /// Capture the current state, moving the items out of the controller
    pub fn into_snapshot(mut self) -> ControllerSnapshot<E> {
        self.prepare_capture();
        let items = std::mem::take(&mut self.items);
        self.snapshot_with(items)
    }

    /// Rehydrate every field from `snapshot` without issuing a request
    pub fn restore(&mut self, snapshot: ControllerSnapshot<E>) -> PagingResult<()> {
        let index = snapshot.validate()?;

        self.items = snapshot.items;
        self.index = index;
        self.pages = snapshot.pages;
        self.next_page = snapshot.next_page;
        self.prev = snapshot.prev;
        self.next = snapshot.next;
        // no load survives a restore, so held items cannot still be loading
        self.state = match snapshot.state {
            ShownState::Loading if !self.items.is_empty() => ShownState::Content,
            state => state,
        };
        self.id_generator.set_next_id(snapshot.next_task_id);
        self.current_task = None;

        debug!(
            items = self.items.len(),
            start_page = self.index.start_page(),
            end_page = self.index.end_page(),
            "restored controller state"
        );
        self.surface.on_reset(&self.items);
        self.surface.on_state_changed(&self.state);
        Ok(())
    }

    /// Restore from `snapshot` if there is a usable one, otherwise start loading.
    ///
    /// A restored controller without items reloads page 0; any load it was
    /// waiting for died with the old controller.
    pub fn resume(&mut self, snapshot: Option<ControllerSnapshot<E>>) -> Option<PageRequest> {
        if let Some(snapshot) = snapshot {
            match self.restore(snapshot) {
                Ok(()) if self.items.is_empty() => {}
                Ok(()) => return None,
                Err(e) => warn!("Discarding saved list state: {}", e),
            }
        }
        Some(self.first_refresh())
    }

    /// Reset to an empty window and load page 0
    pub fn first_refresh(&mut self) -> PageRequest {
        self.items.clear();
        self.index.clear();
        self.pages = 0;
        self.next_page = 0;
        self.prev = None;
        self.next = None;
        self.refresh()
    }
}

impl<E: 'static> PaginatedListController<E> {
    /// Build a controller directly from a snapshot
    pub fn from_snapshot<S, F>(
        snapshot: ControllerSnapshot<E>,
        surface: S,
        is_duplicate: F,
        config: PagerConfig,
    ) -> PagingResult<Self>
    where
        S: ListSurface<E> + 'static,
        F: Fn(&E, &E) -> bool + Send + 'static,
    {
        let mut controller = Self::new(surface, is_duplicate, config);
        controller.restore(snapshot)?;
        Ok(controller)
    }
}
