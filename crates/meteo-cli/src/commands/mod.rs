//! Command implementations for the CLI.

mod config;
mod latest;
mod query;
mod report;
mod stats;
mod sync;
mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use meteo_archive::Archive;
use meteo_watch::GitSync;

use crate::config::Config;
use crate::format::FormatOptions;

pub use config::cmd_config;
pub use latest::cmd_latest;
pub use query::{QueryArgs, cmd_query};
pub use report::cmd_report;
pub use stats::{StatsArgs, cmd_stats};
pub use sync::cmd_sync;
pub use watch::{WatchArgs, cmd_watch};

/// Settings shared by every command, after flags and environment have been
/// applied over the configuration file.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    /// Path the configuration was loaded from, or would be.
    pub config_path: PathBuf,
    pub archive_path: PathBuf,
    pub time_zone: Tz,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl RunContext {
    /// Open the local archive, which must already exist.
    pub fn open_archive(&self) -> Result<Archive> {
        let archive = Archive::open(&self.archive_path).with_context(|| {
            format!(
                "No archive at {} (run `meteo sync` first)",
                self.archive_path.display()
            )
        })?;
        Ok(archive.with_time_zone(self.time_zone))
    }

    /// Git sync for the configured remote and branch.
    pub fn git_sync(&self) -> GitSync {
        GitSync::new(&self.archive_path)
            .remote(&self.config.archive.remote)
            .branch(&self.config.archive.branch)
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions::new(self.time_zone)
    }

    pub fn output(&self) -> Option<&PathBuf> {
        self.output.as_ref()
    }
}
