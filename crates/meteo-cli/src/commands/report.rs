//! Report command - print the station's hardware report verbatim.

use anyhow::{Context, Result};

use crate::commands::RunContext;
use crate::util::write_output;

pub fn cmd_report(ctx: &RunContext) -> Result<()> {
    let archive = ctx.open_archive()?;
    let mut report = archive
        .hardware_report()
        .context("Failed to read the hardware report")?;
    if !report.ends_with('\n') {
        report.push('\n');
    }
    write_output(ctx.output(), &report)
}
