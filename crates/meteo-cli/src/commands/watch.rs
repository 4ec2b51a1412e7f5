//! Watch command - print every newer snapshot until interrupted.
//!
//! The archive is synced and re-read on every poll by a [`StationWatcher`];
//! this command only renders its events. Ctrl-C stops the watcher and waits
//! for the background loop to exit.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use meteo_archive::Archive;
use meteo_watch::{CycleOutcome, StationWatcher, WatchEvent};
use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::commands::RunContext;
use crate::format::{FormatOptions, format_watch_event_text};

/// Arguments for the watch command.
pub struct WatchArgs {
    pub interval: Option<u64>,
    pub format: OutputFormat,
}

pub async fn cmd_watch(args: WatchArgs, ctx: &RunContext) -> Result<()> {
    let WatchArgs { interval, format } = args;

    let mut options = ctx.config.watch.to_options();
    if let Some(secs) = interval {
        options.poll_interval = Duration::from_secs(secs);
    }

    // The archive may not exist until the first sync clones it.
    let archive = Archive::new(&ctx.archive_path).with_time_zone(ctx.time_zone);
    let mut watcher = StationWatcher::new(Arc::new(archive), Arc::new(ctx.git_sync()), options)
        .context("Invalid watch options")?;
    let Some(mut events) = watcher.start_watching() else {
        bail!("Watcher is already running");
    };

    if !ctx.quiet {
        eprintln!(
            "Watching {} every {}s (Ctrl-C to stop)",
            ctx.archive_path.display(),
            watcher.options().poll_interval.as_secs()
        );
    }

    let mut out = open_sink(ctx.output())?;
    let opts = ctx.format_options();
    let mut gave_up = None;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping watcher");
                break;
            }
            event = events.next() => {
                let Some(event) = event else { break };
                if let WatchEvent::Cycle(CycleOutcome::FatalError { message, .. }) = &event {
                    gave_up = Some(message.clone());
                }
                let line = render(&event, format, &opts)?;
                if !line.is_empty() {
                    out.write_all(line.as_bytes())?;
                    out.flush()?;
                }
            }
        }
    }

    watcher.shutdown().await.context("Watcher did not shut down cleanly")?;
    debug!("Watcher shut down");

    match gave_up {
        Some(message) => bail!("Watcher stopped: {}", message),
        None => Ok(()),
    }
}

fn render(event: &WatchEvent, format: OutputFormat, opts: &FormatOptions) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(event)? + "\n"),
        _ => Ok(format_watch_event_text(event, opts)),
    }
}

fn open_sink(output: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}
