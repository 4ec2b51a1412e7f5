use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use meteo_cli::cli::{Cli, Commands, ConfigAction, resolve_format};
use meteo_cli::commands::{
    QueryArgs, RunContext, StatsArgs, WatchArgs, cmd_config, cmd_latest, cmd_query, cmd_report,
    cmd_stats, cmd_sync, cmd_watch,
};
use meteo_cli::config::{Config, default_config_path};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine readable
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = match &cli.command {
        // `config path` and `config init` must work even with a broken file
        Commands::Config {
            action: ConfigAction::Path | ConfigAction::Init { .. },
        } => Config::default(),
        _ => Config::load_validated(cli.config.as_deref())?,
    };
    let ctx = run_context(&cli, config, config_path)?;
    tracing::debug!(
        "Archive {} in {}",
        ctx.archive_path.display(),
        ctx.time_zone.name()
    );

    match cli.command {
        Commands::Query {
            types,
            period,
            page_size,
            page,
            output,
        } => cmd_query(
            QueryArgs {
                types,
                period,
                page_size,
                page,
                format: resolve_format(output.format, cli.json),
                no_header: output.no_header,
            },
            &ctx,
        ),
        Commands::Stats {
            types,
            period,
            output,
        } => cmd_stats(
            StatsArgs {
                types,
                period,
                format: resolve_format(output.format, cli.json),
                no_header: output.no_header,
            },
            &ctx,
        ),
        Commands::Latest { output } => cmd_latest(
            resolve_format(output.format, cli.json),
            output.no_header,
            &ctx,
        ),
        Commands::Report => cmd_report(&ctx),
        Commands::Sync { timeout } => cmd_sync(timeout, &ctx).await,
        Commands::Watch { interval, format } => {
            cmd_watch(
                WatchArgs {
                    interval,
                    format: resolve_format(format, cli.json),
                },
                &ctx,
            )
            .await
        }
        Commands::Config { action } => cmd_config(action, &ctx),
    }
}

/// Apply command-line and environment overrides on top of the file.
fn run_context(cli: &Cli, mut config: Config, config_path: std::path::PathBuf) -> Result<RunContext> {
    if let Some(path) = &cli.archive {
        config.archive.path = path.clone();
    }
    if let Some(name) = &cli.time_zone {
        config.archive.time_zone = name.clone();
    }
    let time_zone = config
        .archive
        .tz()
        .with_context(|| format!("Invalid time zone '{}'", config.archive.time_zone))?;

    Ok(RunContext {
        archive_path: config.archive.path.clone(),
        config,
        config_path,
        time_zone,
        output: cli.output.clone(),
        json: cli.json,
        quiet: cli.quiet,
    })
}
