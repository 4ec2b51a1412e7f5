//! Error types for meteo-archive.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Result type for meteo-archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading the archive.
///
/// Missing day files and short CSV rows are not errors; they are skipped
/// while a query runs. Everything here aborts the operation that raised it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An archive file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The CSV reader failed mid-file.
    #[error("Failed to read CSV file {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    /// A row's value field is not a floating-point number.
    #[error("Invalid value '{raw}' at {path}:{line}")]
    InvalidValue {
        path: PathBuf,
        line: u64,
        raw: String,
    },

    /// A row's timestamp field does not match `yyyy-MM-dd HH:mm:ss`.
    #[error("Invalid timestamp '{raw}' at {path}:{line}")]
    InvalidTimestamp {
        path: PathBuf,
        line: u64,
        raw: String,
    },

    /// The archive root is missing or is not a directory.
    #[error("Archive root {0} is not a directory")]
    NotADirectory(PathBuf),

    /// The latest-snapshot record could not be parsed.
    #[error("Invalid snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A time period whose start lies after its end.
    #[error("Invalid time period: start {start} is after end {end}")]
    InvalidPeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A time zone name not present in the IANA database.
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),
}
