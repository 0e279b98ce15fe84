//! Async driver pairing a controller with a data source.
//!
//! The pager is the single owner of its controller. Fetches run on spawned
//! tokio tasks and report back over a channel; completions are only applied
//! from `&mut self`, so the controller never sees concurrent mutation.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::controller::{Completion, PaginatedListController};
use super::errors::{FetchError, PagingResult};
use super::snapshot::ControllerSnapshot;
use super::source::{DataSource, PageRequest, PageResponse, TaskKind};

/// A finished fetch waiting to be applied
#[derive(Debug)]
struct FetchOutcome<E> {
    task_id: u64,
    result: Result<PageResponse<E>, FetchError>,
}

pub struct Pager<E> {
    controller: PaginatedListController<E>,
    source: Arc<dyn DataSource<E>>,
    fetch_timeout: Option<Duration>,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome<E>>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome<E>>,
    dispatched: u64,
}

impl<E: Send + 'static> Pager<E> {
    pub fn new<D>(controller: PaginatedListController<E>, source: D) -> Self
    where
        D: DataSource<E> + 'static,
    {
        Self::with_shared_source(controller, Arc::new(source))
    }

    pub fn with_shared_source(controller: PaginatedListController<E>, source: Arc<dyn DataSource<E>>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let fetch_timeout = controller.config().fetch_timeout();
        Self {
            controller,
            source,
            fetch_timeout,
            outcome_tx,
            outcome_rx,
            dispatched: 0,
        }
    }

    pub fn controller(&self) -> &PaginatedListController<E> {
        &self.controller
    }

    /// Number of fetches dispatched to the source
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    fn dispatch(&mut self, request: PageRequest) {
        let source = Arc::clone(&self.source);
        let outcome_tx = self.outcome_tx.clone();
        let fetch_timeout = self.fetch_timeout;
        self.dispatched += 1;
        debug!(task_id = request.task_id, source = source.name(), "dispatching fetch");

        tokio::spawn(async move {
            let task_id = request.task_id;
            let result = match fetch_timeout {
                Some(limit) => match tokio::time::timeout(limit, source.fetch_page(&request)).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout(limit)),
                },
                None => source.fetch_page(&request).await,
            };
            // the pager may have been dropped meanwhile
            let _ = outcome_tx.send(FetchOutcome { task_id, result });
        });
    }

    fn dispatch_opt(&mut self, request: Option<PageRequest>) -> bool {
        match request {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    pub fn refresh(&mut self) {
        let request = self.controller.refresh();
        self.dispatch(request);
    }

    pub fn pull_refresh(&mut self) {
        let request = self.controller.on_pull_refresh();
        self.dispatch(request);
    }

    /// Returns whether a fetch was started
    pub fn reached_bottom(&mut self) -> bool {
        let request = self.controller.on_reached_bottom();
        self.dispatch_opt(request)
    }

    /// Returns whether a fetch was started; pages inside the window only scroll
    pub fn jump_to_page(&mut self, page: i32) -> PagingResult<bool> {
        let request = self.controller.jump_to_page(page)?;
        Ok(self.dispatch_opt(request))
    }

    pub fn jump_to_token(&mut self, token: Option<String>, is_next: bool) {
        let request = self.controller.jump_to_token(token, is_next);
        self.dispatch(request);
    }

    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    /// Restore saved state, or start the first load when there is none
    pub fn resume(&mut self, snapshot: Option<ControllerSnapshot<E>>) {
        let request = self.controller.resume(snapshot);
        self.dispatch_opt(request);
    }

    pub fn capture(&mut self) -> ControllerSnapshot<E>
    where
        E: Clone,
    {
        self.controller.capture()
    }

    pub fn into_snapshot(self) -> ControllerSnapshot<E> {
        self.controller.into_snapshot()
    }

    fn apply(&mut self, outcome: FetchOutcome<E>) -> Completion {
        match outcome.result {
            Ok(response) => self.controller.on_page_data(outcome.task_id, response),
            Err(e) => self.controller.on_fetch_error(outcome.task_id, e),
        }
    }

    /// Wait for the next finished fetch and apply it
    pub async fn next_completion(&mut self) -> Option<Completion> {
        let outcome = self.outcome_rx.recv().await?;
        Some(self.apply(outcome))
    }

    /// Apply every fetch that has already finished, without waiting
    pub fn apply_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
            applied += 1;
        }
        applied
    }

    /// Apply completions until no load is in flight
    pub async fn settle(&mut self) {
        while self.controller.is_loading() {
            if self.next_completion().await.is_none() {
                break;
            }
        }
    }

    /// Keep loading further pages until the window is exhausted.
    ///
    /// A re-fetch of the last page ends the run, as does a load that failed
    /// to extend the window. At most `max_loads` loads are issued; returns
    /// how many were.
    pub async fn load_to_end(&mut self, max_loads: usize) -> usize {
        let mut loads = 0;
        while loads < max_loads {
            let Some(request) = self.controller.on_reached_bottom() else {
                break;
            };
            let last_page_refresh = request.kind == TaskKind::RefreshPage;
            let pages_before = self.controller.page_index().len();
            self.dispatch(request);
            self.settle().await;
            loads += 1;

            if last_page_refresh || self.controller.page_index().len() == pages_before {
                break;
            }
        }
        loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PagerConfig;
    use crate::paging::memory::MemorySource;
    use crate::paging::surface::{RecordingSurface, ShownState};

    fn pager(source: MemorySource<u32>, config: PagerConfig) -> Pager<u32> {
        let controller = PaginatedListController::new(RecordingSurface::new(), |a: &u32, b: &u32| a == b, config);
        Pager::new(controller, source)
    }

    #[tokio::test]
    async fn test_resume_loads_first_page() {
        let mut pager = pager(MemorySource::new((0..25).collect(), 10), PagerConfig::default());
        pager.resume(None);
        pager.settle().await;
        assert_eq!(pager.controller().len(), 10);
        assert_eq!(pager.controller().state(), &ShownState::Content);
        assert_eq!(pager.dispatched(), 1);
    }

    #[tokio::test]
    async fn test_load_to_end() {
        let mut pager = pager(MemorySource::new((0..25).collect(), 10), PagerConfig::default());
        pager.refresh();
        pager.settle().await;
        let loads = pager.load_to_end(10).await;
        assert_eq!(loads, 2);
        assert_eq!(pager.controller().len(), 25);
        assert_eq!(pager.controller().page_index().dividers(), &[10, 20, 25]);
    }

    #[tokio::test]
    async fn test_load_to_end_stops_on_failure() {
        let source = MemorySource::new((0..30).collect(), 10).failing_on(1);
        let mut pager = pager(source, PagerConfig::default());
        pager.refresh();
        pager.settle().await;
        assert_eq!(pager.load_to_end(10).await, 1);
        assert_eq!(pager.controller().len(), 10);
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_error() {
        let source = MemorySource::new((0..5).collect(), 10).with_latency(Duration::from_millis(200));
        let config = PagerConfig {
            fetch_timeout_ms: Some(10),
            ..PagerConfig::default()
        };
        let mut pager = pager(source, config);
        pager.refresh();
        pager.settle().await;
        assert_eq!(
            pager.controller().state().error_message(),
            Some("Fetch timed out after 10ms")
        );
    }

    #[tokio::test]
    async fn test_apply_ready_without_waiting() {
        let mut pager = pager(MemorySource::new((0..5).collect(), 10), PagerConfig::default());
        assert_eq!(pager.apply_ready(), 0);
        pager.refresh();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(pager.apply_ready(), 1);
        assert!(!pager.controller().is_loading());
    }
}
