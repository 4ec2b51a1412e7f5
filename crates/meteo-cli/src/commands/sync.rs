//! Sync command - clone the archive if needed and pull the latest changes.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use meteo_watch::ArchiveSync;
use tracing::info;

use crate::commands::RunContext;

/// Execute the sync command.
pub async fn cmd_sync(timeout: Option<u64>, ctx: &RunContext) -> Result<()> {
    let sync = ctx.git_sync();
    let timeout = timeout
        .or(ctx.config.watch.sync_timeout)
        .map(Duration::from_secs);
    let was_cloned = sync.is_cloned();

    let work = async {
        sync.ensure_local_copy()
            .await
            .context("Failed to clone the archive")?;
        if !was_cloned {
            return Ok::<_, anyhow::Error>(true);
        }
        sync.pull_latest()
            .await
            .context("Failed to pull the archive")
    };

    let succeeded = match timeout {
        Some(limit) => match tokio::time::timeout(limit, work).await {
            Ok(result) => result?,
            Err(_) => bail!("Sync timed out after {}s", limit.as_secs()),
        },
        None => work.await?,
    };
    if !succeeded {
        bail!(
            "git pull failed in {} (run with --verbose for details)",
            ctx.archive_path.display()
        );
    }

    let action = if was_cloned { "Updated" } else { "Cloned" };
    info!(
        "{} {} ({}) at {}",
        action,
        ctx.config.archive.remote,
        ctx.config.archive.branch,
        ctx.archive_path.display()
    );
    if !ctx.quiet {
        println!("{} archive at {}", action, ctx.archive_path.display());
    }
    Ok(())
}
