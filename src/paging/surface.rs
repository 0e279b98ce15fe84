//! Presentation-side contract: the list surface the controller drives.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Mutually exclusive views the presentation layer shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ShownState {
    Loading,
    Content,
    /// Nothing to show; carries the hint text from the config
    Empty(String),
    Error(String),
}

impl ShownState {
    pub fn is_content(&self) -> bool {
        matches!(self, ShownState::Content)
    }

    pub fn empty_message(&self) -> Option<&str> {
        match self {
            ShownState::Empty(message) => Some(message),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ShownState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Which progress indicator, if any, should be visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadProgress {
    Idle,
    /// Pull-to-refresh style indicator above the list
    Top,
    /// Footer indicator below the list
    Bottom,
}

/// The scrollable view that renders the controller's items
pub trait ListSurface<E>: Send {
    /// Replace the whole content
    fn on_reset(&mut self, items: &[E]);

    /// Items were inserted; they are already in the backing list
    fn on_insert_range(&mut self, _start: usize, _count: usize) {}

    fn on_remove_range(&mut self, _start: usize, _count: usize) {}

    fn on_scroll_to(&mut self, _index: usize, _smooth: bool) {}

    /// Scroll by a distance in surface units
    fn on_scroll_by(&mut self, _distance: i32, _smooth: bool) {}

    fn on_state_changed(&mut self, state: &ShownState);

    /// Transient message shown over existing content
    fn on_notice(&mut self, _message: &str) {}

    fn on_progress(&mut self, _progress: LoadProgress) {}

    /// First and last visible item positions, inclusive
    fn visible_range(&self) -> Option<(usize, usize)> {
        None
    }
}

/// Record of one surface call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SurfaceEvent {
    Reset { len: usize },
    InsertRange { start: usize, count: usize },
    RemoveRange { start: usize, count: usize },
    ScrollTo { index: usize, smooth: bool },
    ScrollBy { distance: i32, smooth: bool },
    StateChanged { state: ShownState },
    Notice { message: String },
    Progress { progress: LoadProgress },
}

#[derive(Debug, Default)]
struct Recording {
    events: Vec<SurfaceEvent>,
    visible: Option<(usize, usize)>,
}

/// Surface that records every call; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Recording) -> R) -> R {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.with(|rec| rec.events.clone())
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<SurfaceEvent> {
        self.with(|rec| std::mem::take(&mut rec.events))
    }

    pub fn last_state(&self) -> Option<ShownState> {
        self.with(|rec| {
            rec.events.iter().rev().find_map(|event| match event {
                SurfaceEvent::StateChanged { state } => Some(state.clone()),
                _ => None,
            })
        })
    }

    pub fn set_visible_range(&self, range: Option<(usize, usize)>) {
        self.with(|rec| rec.visible = range);
    }

    fn push(&self, event: SurfaceEvent) {
        self.with(|rec| rec.events.push(event));
    }
}

impl<E> ListSurface<E> for RecordingSurface {
    fn on_reset(&mut self, items: &[E]) {
        self.push(SurfaceEvent::Reset { len: items.len() });
    }

    fn on_insert_range(&mut self, start: usize, count: usize) {
        self.push(SurfaceEvent::InsertRange { start, count });
    }

    fn on_remove_range(&mut self, start: usize, count: usize) {
        self.push(SurfaceEvent::RemoveRange { start, count });
    }

    fn on_scroll_to(&mut self, index: usize, smooth: bool) {
        self.push(SurfaceEvent::ScrollTo { index, smooth });
    }

    fn on_scroll_by(&mut self, distance: i32, smooth: bool) {
        self.push(SurfaceEvent::ScrollBy { distance, smooth });
    }

    fn on_state_changed(&mut self, state: &ShownState) {
        self.push(SurfaceEvent::StateChanged {
            state: state.clone(),
        });
    }

    fn on_notice(&mut self, message: &str) {
        self.push(SurfaceEvent::Notice {
            message: message.to_string(),
        });
    }

    fn on_progress(&mut self, progress: LoadProgress) {
        self.push(SurfaceEvent::Progress { progress });
    }

    fn visible_range(&self) -> Option<(usize, usize)> {
        self.with(|rec| rec.visible)
    }
}

/// Surface that only logs what it is asked to do
#[derive(Debug, Clone, Default)]
pub struct TracingSurface {
    label: String,
}

impl TracingSurface {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl<E: Debug> ListSurface<E> for TracingSurface {
    fn on_reset(&mut self, items: &[E]) {
        info!(surface = %self.label, len = items.len(), "reset");
    }

    fn on_insert_range(&mut self, start: usize, count: usize) {
        info!(surface = %self.label, start, count, "insert range");
    }

    fn on_remove_range(&mut self, start: usize, count: usize) {
        info!(surface = %self.label, start, count, "remove range");
    }

    fn on_scroll_to(&mut self, index: usize, smooth: bool) {
        info!(surface = %self.label, index, smooth, "scroll to");
    }

    fn on_scroll_by(&mut self, distance: i32, smooth: bool) {
        info!(surface = %self.label, distance, smooth, "scroll by");
    }

    fn on_state_changed(&mut self, state: &ShownState) {
        info!(surface = %self.label, ?state, "state changed");
    }

    fn on_notice(&mut self, message: &str) {
        warn!(surface = %self.label, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PagerConfig;
    use crate::paging::{FetchError, PageResponse, PaginatedListController};

    #[test]
    fn test_recording_surface_shares_log() {
        let recording = RecordingSurface::new();
        let mut surface = recording.clone();
        ListSurface::<u32>::on_insert_range(&mut surface, 3, 2);
        ListSurface::<u32>::on_state_changed(&mut surface, &ShownState::Content);

        assert_eq!(
            recording.events(),
            vec![
                SurfaceEvent::InsertRange { start: 3, count: 2 },
                SurfaceEvent::StateChanged {
                    state: ShownState::Content
                },
            ]
        );
        assert_eq!(recording.last_state(), Some(ShownState::Content));
        assert_eq!(recording.take().len(), 2);
        assert!(recording.events().is_empty());
    }

    #[test]
    fn test_surface_event_json_shape() {
        let event = SurfaceEvent::StateChanged {
            state: ShownState::Error("offline".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "state_changed");
        assert_eq!(json["state"]["state"], "error");
        assert_eq!(json["state"]["message"], "offline");

        let empty = serde_json::to_value(ShownState::Empty("No galleries".to_string())).unwrap();
        assert_eq!(empty["state"], "empty");
        assert_eq!(empty["message"], "No galleries");
    }

    #[test]
    fn test_tracing_surface_drives_controller() {
        let mut controller = PaginatedListController::new(
            TracingSurface::new("galleries"),
            |a: &u32, b: &u32| a == b,
            PagerConfig::default(),
        );
        let request = controller.refresh();
        controller.on_page_data(request.task_id, PageResponse::new(vec![1, 2, 3], 2, 1));
        let request = controller.on_reached_bottom().unwrap();
        controller.on_fetch_error(request.task_id, FetchError::Network("offline".to_string()));
        assert_eq!(controller.state(), &ShownState::Content);
        assert_eq!(controller.len(), 3);
    }
}
