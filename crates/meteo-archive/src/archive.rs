//! Archive query engine.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Utc;
use chrono_tz::Tz;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, trace};

use meteo_types::{DataType, LatestMeasurements, SnapshotRecord};

use crate::error::{Error, Result};
use crate::layout::{self, HARDWARE_REPORT_FILE, SNAPSHOT_FILE};
use crate::models::{ArchiveQueryResult, Paginator};
use crate::query::ArchiveQuery;

/// A day file selected for reading by a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub data_type: DataType,
}

/// Read-only handle on a local copy of the station archive.
///
/// Every call re-reads the filesystem; nothing is cached between queries.
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
    time_zone: Tz,
}

impl Archive {
    /// Create a handle without checking that `root` exists.
    ///
    /// Useful when the archive is about to be cloned into `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            time_zone: crate::DEFAULT_TIME_ZONE,
        }
    }

    /// Open an existing archive directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::NotADirectory(root));
        }
        info!("Opening archive at {}", root.display());
        Ok(Self::new(root))
    }

    /// Open the archive at the default location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_archive_path())
    }

    /// Set the zone CSV timestamps and day directories are expressed in.
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Path of the latest-snapshot record.
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE)
    }

    /// Path of the hardware report.
    pub fn report_path(&self) -> PathBuf {
        self.root.join(HARDWARE_REPORT_FILE)
    }

    // === Queries ===

    /// List the existing day files a query would read, in discovery order.
    ///
    /// Periods are visited in query order, then data types in query order,
    /// then days ascending. Days without a file are skipped.
    pub fn resolve_files(&self, query: &ArchiveQuery) -> Vec<ArchiveFile> {
        let data_types = query.distinct_data_types();
        let mut files = Vec::new();

        for period in &query.periods {
            let days = period.days(self.time_zone);
            for &data_type in &data_types {
                for day in &days {
                    let path = layout::day_file(&self.root, *day, data_type);
                    if path.is_file() {
                        files.push(ArchiveFile { path, data_type });
                    } else {
                        trace!("No {} file for {}", data_type.file_stem(), day);
                    }
                }
            }
        }

        files
    }

    /// Run a query against the archive.
    ///
    /// Missing day files and rows with fewer than two fields are skipped. An
    /// unreadable file, a malformed timestamp or a non-numeric value aborts the
    /// whole query.
    pub fn query(&self, query: &ArchiveQuery) -> Result<ArchiveQueryResult> {
        let queried_at = Utc::now();
        let files = self.resolve_files(query);
        debug!(
            "Query over {} period(s) resolved {} file(s)",
            query.periods.len(),
            files.len()
        );

        let mut paginator = Paginator::new(query.page_size);
        for file in &files {
            self.read_file(file, &mut paginator)?;
        }
        let pages = paginator.finish();

        debug!(
            "Query returned {} value(s) in {} page(s)",
            pages.total_values(),
            pages.len()
        );
        Ok(ArchiveQueryResult { pages, queried_at })
    }

    fn read_file(&self, file: &ArchiveFile, paginator: &mut Paginator) -> Result<()> {
        let path = &file.path;
        let reader = File::open(path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut record = StringRecord::new();
        let mut skipped = 0usize;
        loop {
            let more = reader.read_record(&mut record).map_err(|source| Error::Csv {
                path: path.clone(),
                source,
            })?;
            if !more {
                break;
            }

            let line = record.position().map_or(0, |p| p.line());
            if significant_fields(&record) < 2 {
                skipped += 1;
                continue;
            }

            let raw_timestamp = &record[0];
            let timestamp = layout::parse_timestamp(self.time_zone, raw_timestamp).ok_or_else(
                || Error::InvalidTimestamp {
                    path: path.clone(),
                    line,
                    raw: raw_timestamp.to_string(),
                },
            )?;

            let raw_value = &record[1];
            let value = raw_value
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidValue {
                    path: path.clone(),
                    line,
                    raw: raw_value.to_string(),
                })?;

            paginator.push(meteo_types::Value::new(
                timestamp,
                path.clone(),
                line,
                value,
                file.data_type,
            ));
        }

        if skipped > 0 {
            debug!("Skipped {} short row(s) in {}", skipped, path.display());
        }
        Ok(())
    }

    // === Snapshot ===

    /// Read and parse the latest-snapshot record.
    pub fn latest_measurements(&self) -> Result<LatestMeasurements> {
        let path = self.snapshot_path();
        let text = std::fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let record: SnapshotRecord =
            serde_json::from_str(&text).map_err(|source| Error::Snapshot {
                path: path.clone(),
                source,
            })?;
        Ok(LatestMeasurements::from_record(&record, &path))
    }

    /// Read the hardware report verbatim.
    pub fn hardware_report(&self) -> Result<String> {
        let path = self.report_path();
        std::fs::read_to_string(&path).map_err(|source| Error::Io { path, source })
    }
}

/// Number of fields up to and including the last non-empty one.
fn significant_fields(record: &StringRecord) -> usize {
    (0..record.len())
        .rev()
        .find(|&i| !record[i].is_empty())
        .map_or(0, |i| i + 1)
}
