//! Query engine and statistics for the weather station archive.
//!
//! The archive is a directory tree holding one CSV file per day per data
//! type, plus the station's latest snapshot (`last.json`) and its hardware
//! report (`report.txt`) at the root. This crate reads it; keeping the local
//! copy up to date is left to `meteo-watch`.
//!
//! # Features
//!
//! - Resolve day files for any set of periods and data types
//! - Stream CSV rows into paginated results
//! - Per-type statistics (mean, min, max, integer mode, standard deviation)
//! - Read the latest snapshot and hardware report
//!
//! # Example
//!
//! ```no_run
//! use meteo_archive::{Archive, ArchiveQuery, RelativePeriod, StatisticalReporter, TimePeriod};
//! use meteo_types::DataType;
//!
//! let archive = Archive::open_default()?;
//! let now = chrono::Utc::now();
//!
//! let query = ArchiveQuery::new()
//!     .data_type(DataType::Temperature)
//!     .period(TimePeriod::relative(RelativePeriod::LastWeek, now, archive.time_zone()));
//! let result = archive.query(&query)?;
//!
//! let mut reporter = StatisticalReporter::new(&result);
//! let stats = reporter.report_for(DataType::Temperature);
//! println!("mean {:.1} over {} readings", stats.mean, stats.count);
//! # Ok::<(), meteo_archive::Error>(())
//! ```

mod archive;
mod error;
pub mod layout;
mod models;
mod period;
mod query;
mod stats;

use chrono_tz::Tz;

pub use archive::{Archive, ArchiveFile};
pub use error::{Error, Result};
pub use models::{ArchiveQueryResult, Page, PageList};
pub use period::{RelativePeriod, TimePeriod};
pub use query::{ArchiveQuery, DEFAULT_PAGE_SIZE};
pub use stats::{Accumulator, Pamphlet, StatisticalReporter, Statistics};

/// Zone the station records its CSV timestamps in.
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Europe::Rome;

/// Default archive path following platform conventions.
///
/// - Linux: `~/.local/share/meteo/archive`
/// - macOS: `~/Library/Application Support/meteo/archive`
/// - Windows: `C:\Users\<user>\AppData\Local\meteo\archive`
pub fn default_archive_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("meteo")
        .join("archive")
}

/// Look up an IANA time zone by name.
///
/// ```
/// assert!(meteo_archive::parse_time_zone("Europe/Rome").is_ok());
/// assert!(meteo_archive::parse_time_zone("Mars/Olympus").is_err());
/// ```
pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| Error::UnknownTimeZone(name.to_string()))
}
