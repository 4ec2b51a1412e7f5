//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use meteo_archive::RelativePeriod;
use meteo_types::DataType;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Which days to read from the archive.
///
/// Relative periods and an explicit range can be combined; every period is
/// queried. With neither, the query covers today.
#[derive(Debug, Clone, Default, Args)]
pub struct PeriodArgs {
    /// Relative period (today, yesterday, this-week, last-week, this-month,
    /// last-month, this-year, last-year); repeatable
    #[arg(short, long = "period", value_name = "PERIOD")]
    pub periods: Vec<RelativePeriod>,

    /// Start of an explicit range (RFC 3339, "YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DD",
    /// local times in the archive time zone)
    #[arg(long)]
    pub from: Option<String>,

    /// End of an explicit range, exclusive (same formats as --from; defaults to now)
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Omit header row in CSV output (useful for appending)
    #[arg(long)]
    pub no_header: bool,
}

#[derive(Parser)]
#[command(name = "meteo")]
#[command(author, version, about = "Query and watch the Cocito weather station archive", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "METEO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Local archive directory (overrides the configuration file)
    #[arg(short, long, global = true, env = "METEO_ARCHIVE")]
    pub archive: Option<PathBuf>,

    /// IANA time zone of the archive (overrides the configuration file)
    #[arg(long, global = true)]
    pub time_zone: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List archived values, page by page
    Query {
        /// Data types to read (file stem or symbol); all when omitted
        #[arg(value_name = "TYPE")]
        types: Vec<DataType>,

        #[command(flatten)]
        period: PeriodArgs,

        /// Values per page (0 disables pagination)
        #[arg(short = 's', long)]
        page_size: Option<usize>,

        /// Print only this page (1-based)
        #[arg(long)]
        page: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Per-type statistics over archived values
    Stats {
        /// Data types to summarize; all when omitted
        #[arg(value_name = "TYPE")]
        types: Vec<DataType>,

        #[command(flatten)]
        period: PeriodArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the latest snapshot
    Latest {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the station's hardware report
    Report,

    /// Clone the archive if needed and pull the latest changes
    Sync {
        /// Give up after this many seconds
        #[arg(short = 'T', long)]
        timeout: Option<u64>,
    },

    /// Poll the archive and print every newer snapshot until interrupted
    Watch {
        /// Poll interval in seconds (overrides the configuration file)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Output format (text, json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// The format a command should use, honoring the global `--json` shorthand.
pub fn resolve_format(format: OutputFormat, json: bool) -> OutputFormat {
    if json { OutputFormat::Json } else { format }
}
