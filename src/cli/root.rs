use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use pagewise::PagerConfig;
use super::demo::DemoCommand;

/// pagewise - windowed pagination for remote lists
#[derive(Parser)]
#[command(
    name = "pagewise",
    version,
    about = "Windowed pagination for remote lists",
    long_about = r#"pagewise keeps a window of remote pages in memory, merging forward,
backward and random-access loads while dropping duplicates at page seams.

Examples:
  pagewise demo                          # Scroll through a simulated listing
  pagewise demo --overlap 2 --json       # Drifting pages, events as JSON lines
  pagewise demo --start-page 3           # Open in the middle, then pull back"#
)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scripted session against an in-memory listing
    Demo(DemoCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let config = PagerConfig::init(self.config.as_deref()).await?;
        debug!(?config, "Configuration initialized");

        match self.command {
            Commands::Demo(demo) => demo.execute(config).await,
        }
    }
}
