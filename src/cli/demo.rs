use anyhow::{anyhow, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pagewise::{
    ControllerSnapshot, MemorySource, PagerConfig, PaginatedListController, Pager, RecordingSurface, SurfaceEvent,
};

/// Run a scripted session against an in-memory listing
#[derive(Args)]
pub struct DemoCommand {
    /// Number of entries in the simulated listing
    #[arg(long = "total-items", default_value_t = 95)]
    pub total_items: u64,

    /// Entries per page
    #[arg(long = "page-size", default_value_t = 25)]
    pub page_size: usize,

    /// Entries repeated at the start of every page after the first
    #[arg(long = "overlap", default_value_t = 0)]
    pub overlap: usize,

    /// Page that always fails to load
    #[arg(long = "fail-page")]
    pub fail_page: Option<i32>,

    /// Page to open the listing at
    #[arg(long = "start-page", default_value_t = 0)]
    pub start_page: i32,

    /// Use cursor tokens instead of page numbers
    #[arg(long = "cursors")]
    pub cursors: bool,

    /// Print surface events as JSON lines
    #[arg(long = "json")]
    pub json: bool,
}

/// One simulated listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub gid: u64,
    pub title: String,
}

fn same_gallery(a: &GalleryEntry, b: &GalleryEntry) -> bool {
    a.gid == b.gid
}

impl DemoCommand {
    pub async fn execute(&self, config: PagerConfig) -> Result<()> {
        debug!("Executing demo command");
        if self.page_size == 0 {
            return Err(anyhow!("--page-size must be greater than 0"));
        }

        let entries = (0..self.total_items)
            .map(|gid| GalleryEntry {
                gid,
                title: format!("Gallery #{}", gid),
            })
            .collect();
        let mut source = MemorySource::new(entries, self.page_size).with_overlap(self.overlap);
        if self.cursors {
            source = source.with_cursors();
        }
        if let Some(page) = self.fail_page {
            source = source.failing_on(page);
        }

        let surface = RecordingSurface::new();
        let controller = PaginatedListController::new(surface.clone(), same_gallery, config.clone());
        let mut pager = Pager::new(controller, source);

        info!("Loading first page");
        pager.resume(None);
        pager.settle().await;
        self.print_events(&surface)?;

        if self.start_page > 0 {
            info!(page = self.start_page, "Jumping");
            if pager.jump_to_page(self.start_page)? {
                pager.settle().await;
            }
            self.print_events(&surface)?;

            info!("Pulling back one page");
            pager.pull_refresh();
            pager.settle().await;
            self.print_events(&surface)?;
        }

        let loads = pager.load_to_end(1_000).await;
        info!(loads, "Scrolled to the end");
        self.print_events(&surface)?;

        let snapshot = pager.into_snapshot();
        let saved = serde_json::to_string(&snapshot)?;
        let decoded: ControllerSnapshot<GalleryEntry> = serde_json::from_str(&saved)?;

        let restored_surface = RecordingSurface::new();
        let restored = PaginatedListController::from_snapshot(decoded, restored_surface.clone(), same_gallery, config)?;
        self.print_events(&restored_surface)?;

        println!(
            "items={} pages={}..{} of {} dividers={:?} state={:?} snapshot_bytes={}",
            restored.len(),
            restored.start_page(),
            restored.end_page(),
            restored.pages(),
            restored.page_index().dividers(),
            restored.state(),
            saved.len()
        );
        Ok(())
    }

    fn print_events(&self, surface: &RecordingSurface) -> Result<()> {
        for event in surface.take() {
            if self.json {
                println!("{}", serde_json::to_string(&event)?);
            } else {
                println!("{}", describe(&event));
            }
        }
        Ok(())
    }
}

fn describe(event: &SurfaceEvent) -> String {
    match event {
        SurfaceEvent::Reset { len } => format!("reset        {} items", len),
        SurfaceEvent::InsertRange { start, count } => format!("insert       [{}, {})", start, start + count),
        SurfaceEvent::RemoveRange { start, count } => format!("remove       [{}, {})", start, start + count),
        SurfaceEvent::ScrollTo { index, smooth } => format!("scroll to    {}{}", index, if *smooth { " (smooth)" } else { "" }),
        SurfaceEvent::ScrollBy { distance, .. } => format!("scroll by    {}", distance),
        SurfaceEvent::StateChanged { state } => format!("state        {:?}", state),
        SurfaceEvent::Notice { message } => format!("notice       {}", message),
        SurfaceEvent::Progress { progress } => format!("progress     {:?}", progress),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_ranges() {
        assert_eq!(
            describe(&SurfaceEvent::InsertRange { start: 25, count: 25 }),
            "insert       [25, 50)"
        );
        assert_eq!(describe(&SurfaceEvent::Reset { len: 3 }), "reset        3 items");
    }

    #[test]
    fn test_same_gallery_compares_ids_only() {
        let a = GalleryEntry {
            gid: 7,
            title: "old title".to_string(),
        };
        let b = GalleryEntry {
            gid: 7,
            title: "renamed".to_string(),
        };
        assert!(same_gallery(&a, &b));
    }
}
