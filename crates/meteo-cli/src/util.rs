//! Shared helpers for command implementations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use meteo_archive::layout::{TIMESTAMP_FORMAT, resolve_local};
use meteo_archive::{ArchiveQuery, TimePeriod};
use meteo_types::DataType;

use crate::cli::PeriodArgs;

/// Parse a user-supplied instant.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00Z`), a local date-time
/// (`2024-01-15 10:30:00`) or a bare local date (`2024-01-15`, meaning
/// midnight). Local forms are read in `tz`.
pub fn parse_datetime(raw: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Ok(resolve_local(tz, local));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(resolve_local(tz, date.and_time(NaiveTime::MIN)));
    }
    bail!(
        "Invalid date/time '{}'. Use RFC 3339 (2024-01-15T10:30:00Z), \
         '2024-01-15 10:30:00' or '2024-01-15'",
        raw
    )
}

/// Time periods selected on the command line, evaluated at `now`.
///
/// Defaults to today when nothing was selected.
pub fn resolve_periods(args: &PeriodArgs, now: DateTime<Utc>, tz: Tz) -> Result<Vec<TimePeriod>> {
    let mut periods: Vec<TimePeriod> = args
        .periods
        .iter()
        .map(|kind| TimePeriod::relative(*kind, now, tz))
        .collect();

    if let Some(from) = &args.from {
        let start = parse_datetime(from, tz)?;
        let end = match &args.to {
            Some(to) => parse_datetime(to, tz)?,
            None => now,
        };
        periods.push(TimePeriod::new(start, end).context("Invalid --from/--to range")?);
    }

    if periods.is_empty() {
        periods.push(TimePeriod::relative(
            meteo_archive::RelativePeriod::Today,
            now,
            tz,
        ));
    }
    Ok(periods)
}

/// Build a query over `types` (all types when empty) and `periods`.
pub fn build_query(types: &[DataType], periods: Vec<TimePeriod>, page_size: usize) -> ArchiveQuery {
    let query = if types.is_empty() {
        ArchiveQuery::new().all_data_types()
    } else {
        ArchiveQuery::new().data_types(types.iter().copied())
    };
    periods
        .into_iter()
        .fold(query, ArchiveQuery::period)
        .page_size(page_size)
}

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
