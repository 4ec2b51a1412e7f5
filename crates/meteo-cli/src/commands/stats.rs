//! Stats command - per-type statistics over archived values.

use anyhow::{Context, Result};
use chrono::Utc;
use meteo_archive::StatisticalReporter;
use meteo_types::DataType;

use crate::cli::{OutputFormat, PeriodArgs};
use crate::commands::RunContext;
use crate::format::{as_json, format_stats_csv, format_stats_text};
use crate::util::{build_query, resolve_periods, write_output};

/// Arguments for the stats command.
pub struct StatsArgs {
    pub types: Vec<DataType>,
    pub period: PeriodArgs,
    pub format: OutputFormat,
    pub no_header: bool,
}

pub fn cmd_stats(args: StatsArgs, ctx: &RunContext) -> Result<()> {
    let StatsArgs {
        types,
        period,
        format,
        no_header,
    } = args;

    let archive = ctx.open_archive()?;
    let periods = resolve_periods(&period, Utc::now(), ctx.time_zone)?;
    // Pages only matter for display; read everything at once.
    let query = build_query(&types, periods, 0);
    let result = archive.query(&query).context("Query failed")?;

    let mut reporter = StatisticalReporter::new(&result);
    let stats: Vec<_> = query
        .data_types
        .iter()
        .map(|dt| reporter.report_for(*dt))
        .collect();

    let content = match format {
        OutputFormat::Json => as_json(&stats)?,
        OutputFormat::Csv => {
            format_stats_csv(&stats, &ctx.format_options().with_no_header(no_header))?
        }
        OutputFormat::Text => format_stats_text(&stats),
    };
    write_output(ctx.output(), &content)
}
