//! Latest command - show the most recent snapshot.

use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::commands::RunContext;
use crate::format::{as_json, format_latest_csv, format_latest_text};
use crate::util::write_output;

pub fn cmd_latest(format: OutputFormat, no_header: bool, ctx: &RunContext) -> Result<()> {
    let archive = ctx.open_archive()?;
    let latest = archive
        .latest_measurements()
        .context("Failed to read the latest snapshot")?;

    let opts = ctx.format_options().with_no_header(no_header);
    let content = match format {
        OutputFormat::Json => as_json(&latest)?,
        OutputFormat::Csv => format_latest_csv(&latest, &opts)?,
        OutputFormat::Text => format_latest_text(&latest, &opts),
    };
    write_output(ctx.output(), &content)
}
