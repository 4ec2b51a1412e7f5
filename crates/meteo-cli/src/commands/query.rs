//! Query command - list archived values page by page.

use anyhow::{Context, Result};
use chrono::Utc;
use meteo_types::DataType;
use tracing::info;

use crate::cli::{OutputFormat, PeriodArgs};
use crate::commands::RunContext;
use crate::format::{format_query_csv, format_query_json, format_query_text, select_pages};
use crate::util::{build_query, resolve_periods, write_output};

/// Arguments for the query command.
pub struct QueryArgs {
    pub types: Vec<DataType>,
    pub period: PeriodArgs,
    pub page_size: Option<usize>,
    pub page: Option<usize>,
    pub format: OutputFormat,
    pub no_header: bool,
}

pub fn cmd_query(args: QueryArgs, ctx: &RunContext) -> Result<()> {
    let QueryArgs {
        types,
        period,
        page_size,
        page,
        format,
        no_header,
    } = args;

    let archive = ctx.open_archive()?;
    let periods = resolve_periods(&period, Utc::now(), ctx.time_zone)?;
    let page_size = page_size.unwrap_or(ctx.config.query.page_size);
    let query = build_query(&types, periods, page_size);

    let result = archive.query(&query).context("Query failed")?;
    info!(
        "{} values in {} page(s)",
        result.total_values(),
        result.pages.len()
    );

    let pages = select_pages(&result, page)?;
    let opts = ctx.format_options().with_no_header(no_header);
    let content = match format {
        OutputFormat::Json => format_query_json(&result, &pages)?,
        OutputFormat::Csv => format_query_csv(&pages, &opts)?,
        OutputFormat::Text => format_query_text(&result, &pages, &opts),
    };
    write_output(ctx.output(), &content)
}
