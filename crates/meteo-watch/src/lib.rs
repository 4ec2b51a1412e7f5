//! Background watcher for the weather station archive.
//!
//! This crate keeps a local copy of the station's archive in sync with its
//! public repository and reports every newer snapshot the station publishes.
//!
//! # Features
//!
//! - **Polling watcher**: one background loop per [`StationWatcher`], cancellable at any await point
//! - **Ordered events**: hardware report, then measurements, then the cycle outcome
//! - **Error reporting**: failed cycles are reported and the loop keeps going
//! - **Git sync**: clone on first use, `git pull` on every cycle, optional timeout
//! - **Testing**: [`MockStation`] scripts snapshots and failures
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use meteo_archive::Archive;
//! use meteo_watch::{GitSync, StationListener, StationWatcher, WatchOptions};
//! use meteo_types::LatestMeasurements;
//!
//! struct Printer;
//!
//! impl StationListener for Printer {
//!     fn on_latest_hardware_report(&mut self, report: &str) {
//!         println!("{report}");
//!     }
//!
//!     fn on_latest_measurements(&mut self, latest: &LatestMeasurements) {
//!         println!("{} °C", latest.temperature.value);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = meteo_archive::default_archive_path();
//!     let options = WatchOptions::builder()
//!         .poll_interval(Duration::from_secs(60))
//!         .sync_timeout(Duration::from_secs(300))
//!         .build();
//!
//!     let mut watcher = StationWatcher::new(
//!         Arc::new(Archive::new(&root)),
//!         Arc::new(GitSync::new(&root)),
//!         options,
//!     )?;
//!
//!     if let Some(events) = watcher.start_watching() {
//!         events.forward_to(&mut Printer).await;
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod events;
pub mod git;
pub mod mock;
pub mod traits;
pub mod watcher;

pub use error::{Error, Result};
pub use events::{CycleOutcome, StationListener, WatchEvent, WatchEvents};
pub use git::{DEFAULT_BRANCH, DEFAULT_REMOTE, GitSync};
pub use mock::MockStation;
pub use traits::{ArchiveSync, StationSource};
pub use watcher::{DEFAULT_POLL_INTERVAL, StationWatcher, WatchOptions, WatchOptionsBuilder};
