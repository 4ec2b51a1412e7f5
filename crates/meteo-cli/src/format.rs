//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use meteo_archive::layout::TIMESTAMP_FORMAT;
use meteo_archive::{ArchiveQueryResult, Page, Statistics};
use meteo_types::{LatestMeasurements, Value};
use meteo_watch::{CycleOutcome, WatchEvent};
use serde::Serialize;

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Zone used to show timestamps in text output.
    pub time_zone: Tz,
    /// Omit header row in CSV output.
    pub no_header: bool,
}

impl FormatOptions {
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            no_header: false,
        }
    }

    /// Create with no_header option for CSV output.
    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    /// Local wall-clock time as recorded in the archive.
    pub fn local_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.time_zone)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}

/// Serialize value to pretty JSON with a trailing newline.
pub fn as_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)? + "\n")
}

fn csv_string(records: Vec<Vec<String>>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.write_record(&record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Pages selected for output: all of them, or just `page` (1-based).
pub fn select_pages(result: &ArchiveQueryResult, page: Option<usize>) -> Result<Vec<(usize, &Page)>> {
    match page {
        None => Ok(result.pages.iter().enumerate().map(|(i, p)| (i + 1, p)).collect()),
        Some(n) => {
            let selected = n
                .checked_sub(1)
                .and_then(|i| result.pages.get(i))
                .with_context(|| {
                    format!("Page {} does not exist (result has {} pages)", n, result.pages.len())
                })?;
            Ok(vec![(n, selected)])
        }
    }
}

fn value_row(value: &Value, opts: &FormatOptions) -> String {
    format!(
        "{:<19}  {:<12}  {:>9.2} {:<6}  {}:{}\n",
        opts.local_time(value.timestamp),
        value.data_type.file_stem(),
        value.value,
        value.data_type.unit(),
        value.source_file.display(),
        value.source_line
    )
}

#[must_use]
pub fn format_query_text(
    result: &ArchiveQueryResult,
    pages: &[(usize, &Page)],
    opts: &FormatOptions,
) -> String {
    if result.total_values() == 0 {
        return "No values found.\n".to_string();
    }

    let mut output = format!(
        "{} values in {} page(s), times in {}\n",
        result.total_values(),
        result.pages.len(),
        opts.time_zone.name()
    );
    for (number, page) in pages {
        output.push_str(&format!("\nPage {} ({} values)\n", number, page.len()));
        for value in page.iter() {
            output.push_str(&value_row(value, opts));
        }
    }
    output
}

pub fn format_query_csv(pages: &[(usize, &Page)], opts: &FormatOptions) -> Result<String> {
    let mut records = Vec::new();
    if !opts.no_header {
        records.push(
            ["page", "timestamp", "type", "value", "unit", "source_file", "source_line"]
                .map(String::from)
                .to_vec(),
        );
    }
    for (number, page) in pages {
        for value in page.iter() {
            records.push(vec![
                number.to_string(),
                value.timestamp.to_rfc3339(),
                value.data_type.file_stem().to_string(),
                value.value.to_string(),
                value.data_type.unit().to_string(),
                value.source_file.display().to_string(),
                value.source_line.to_string(),
            ]);
        }
    }
    csv_string(records)
}

pub fn format_query_json(result: &ArchiveQueryResult, pages: &[(usize, &Page)]) -> Result<String> {
    #[derive(Serialize)]
    struct PageJson<'a> {
        page: usize,
        values: &'a Page,
    }

    #[derive(Serialize)]
    struct QueryJson<'a> {
        queried_at: DateTime<Utc>,
        total_values: usize,
        page_count: usize,
        pages: Vec<PageJson<'a>>,
    }

    as_json(&QueryJson {
        queried_at: result.queried_at,
        total_values: result.total_values(),
        page_count: result.pages.len(),
        pages: pages
            .iter()
            .map(|&(page, values)| PageJson { page, values })
            .collect(),
    })
}

#[must_use]
pub fn format_stats_text(stats: &[Statistics]) -> String {
    let mut output = format!(
        "{:<12}  {:>6}  {:>9}  {:>9}  {:>9}  {:>6}  {:>9}  {}\n",
        "Type", "Count", "Mean", "Min", "Max", "Mode", "Std dev", "Unit"
    );
    for s in stats {
        output.push_str(&format!(
            "{:<12}  {:>6}  {:>9.2}  {:>9.2}  {:>9.2}  {:>6}  {:>9.2}  {}\n",
            s.data_type.file_stem(),
            s.count,
            s.mean,
            s.min,
            s.max,
            s.integer_mode,
            s.standard_deviation,
            s.data_type.unit()
        ));
    }
    output
}

pub fn format_stats_csv(stats: &[Statistics], opts: &FormatOptions) -> Result<String> {
    let mut records = Vec::new();
    if !opts.no_header {
        records.push(
            ["type", "count", "mean", "min", "max", "integer_mode", "standard_deviation"]
                .map(String::from)
                .to_vec(),
        );
    }
    for s in stats {
        records.push(vec![
            s.data_type.file_stem().to_string(),
            s.count.to_string(),
            s.mean.to_string(),
            s.min.to_string(),
            s.max.to_string(),
            s.integer_mode.to_string(),
            s.standard_deviation.to_string(),
        ]);
    }
    csv_string(records)
}

#[must_use]
pub fn format_latest_text(latest: &LatestMeasurements, opts: &FormatOptions) -> String {
    let mut output = format!(
        "Latest snapshot: {} ({})\n",
        opts.local_time(latest.observed_at),
        opts.time_zone.name()
    );
    for value in latest.values() {
        output.push_str(&format!(
            "  {:<34} {:>9.2} {}\n",
            value.data_type.english_name(),
            value.value,
            value.data_type.unit()
        ));
    }
    output
}

pub fn format_latest_csv(latest: &LatestMeasurements, opts: &FormatOptions) -> Result<String> {
    let mut records = Vec::new();
    if !opts.no_header {
        records.push(["timestamp", "type", "value", "unit"].map(String::from).to_vec());
    }
    for value in latest.values() {
        records.push(vec![
            latest.observed_at.to_rfc3339(),
            value.data_type.file_stem().to_string(),
            value.value.to_string(),
            value.data_type.unit().to_string(),
        ]);
    }
    csv_string(records)
}

/// One line per watcher event, for `meteo watch`.
#[must_use]
pub fn format_watch_event_text(event: &WatchEvent, opts: &FormatOptions) -> String {
    match event {
        WatchEvent::HardwareReport { report } => {
            let mut output = "Hardware report:\n".to_string();
            for line in report.lines() {
                output.push_str(&format!("  {}\n", line));
            }
            output
        }
        WatchEvent::Measurements(latest) => {
            let values: Vec<String> = latest
                .values()
                .map(|v| format!("{}={:.2}{}", v.data_type.symbol(), v.value, v.data_type.unit()))
                .collect();
            format!(
                "[{}] {}\n",
                opts.local_time(latest.observed_at),
                values.join(" ")
            )
        }
        WatchEvent::Cycle(CycleOutcome::TransientError {
            message,
            consecutive_failures,
        }) => format!("Poll failed ({} in a row): {}\n", consecutive_failures, message),
        WatchEvent::Cycle(CycleOutcome::FatalError {
            message,
            consecutive_failures,
        }) => format!(
            "Giving up after {} failed poll(s): {}\n",
            consecutive_failures, message
        ),
        // Quiet cycles are logged, not printed.
        _ => String::new(),
    }
}
