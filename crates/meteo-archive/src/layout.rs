//! On-disk layout of the archive.
//!
//! The archive stores one CSV file per day per data type:
//!
//! ```text
//! <root>/<YYYY>/<MM>/<DD>/<file_stem>.csv
//! ```
//!
//! Directory names are identifiers, not display strings, so they are built
//! here from numeric date parts with fixed zero padding. Which calendar day an
//! instant belongs to is always decided in an explicitly passed time zone.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use meteo_types::DataType;

/// Name of the latest-snapshot record at the archive root.
pub const SNAPSHOT_FILE: &str = "last.json";

/// Name of the free-text hardware report at the archive root.
pub const HARDWARE_REPORT_FILE: &str = "report.txt";

/// Local-time format of the first CSV column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Directory holding every file of one day.
///
/// ```
/// use std::path::Path;
/// use chrono::NaiveDate;
/// use meteo_archive::layout::day_directory;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
/// assert_eq!(day_directory(Path::new("dati"), date), Path::new("dati/2024/03/07"));
/// ```
pub fn day_directory(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}", date.day()))
}

/// CSV file for one data type on one day.
pub fn day_file(root: &Path, date: NaiveDate, data_type: DataType) -> PathBuf {
    day_directory(root, date).join(format!("{}.csv", data_type.file_stem()))
}

/// Convert a wall-clock time in `tz` to an instant.
///
/// Times repeated by a backward DST shift resolve to their earlier instant.
/// Times skipped by a forward shift are moved forward by an hour, landing on
/// the same instant a clock would show just after the jump.
pub fn resolve_local(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    if let Some(at) = tz.from_local_datetime(&local).earliest() {
        return at.with_timezone(&Utc);
    }
    let shifted = local + TimeDelta::hours(1);
    match tz.from_local_datetime(&shifted).earliest() {
        Some(at) => at.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&local),
    }
}

/// Parse a CSV timestamp recorded as local time in `tz`.
pub fn parse_timestamp(tz: Tz, raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .ok()
        .map(|local| resolve_local(tz, local))
}

/// Calendar day of an instant as seen in `tz`.
pub fn local_date(tz: Tz, at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}
