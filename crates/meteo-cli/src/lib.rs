//! Command-line interface for the Cocito weather station archive.
//!
//! The `meteo` binary reads the station's public archive from a local git
//! clone: it lists archived values, summarizes them, shows the latest
//! snapshot and keeps watching for newer ones.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `query` | List archived values, page by page |
//! | `stats` | Count, mean, min, max, integer mode and standard deviation per type |
//! | `latest` | Show the latest snapshot (`last.json`) |
//! | `report` | Print the hardware report (`report.txt`) |
//! | `sync` | Clone the archive if needed and pull the latest changes |
//! | `watch` | Poll the archive and print every newer snapshot |
//! | `config` | Show, locate or initialize the configuration file |
//!
//! # Output Formats
//!
//! - **Text** (default): aligned columns, times in the archive's time zone
//! - **JSON**: machine-readable, instants in UTC
//! - **CSV**: one row per value, instants in UTC
//!
//! # Configuration
//!
//! Settings are read from `<config dir>/meteo/config.toml` (or `--config`):
//!
//! ```toml
//! [archive]
//! path = "/home/me/.local/share/meteo/archive"
//! remote = "https://github.com/StazioneMeteoCocito/dati.git"
//! branch = "main"
//! time_zone = "Europe/Rome"
//!
//! [query]
//! page_size = 100
//!
//! [watch]
//! poll_interval = 60
//! sync_timeout = 300
//! ```
//!
//! # Environment Variables
//!
//! - `METEO_ARCHIVE`: archive directory (overridden by `--archive`)
//! - `METEO_CONFIG`: configuration file (overridden by `--config`)
//! - `RUST_LOG`: log filter when neither `--verbose` nor `--quiet` is given
//!
//! # Examples
//!
//! ```bash
//! meteo sync
//! meteo query temperature humidity --period yesterday --page-size 50
//! meteo stats --from 2024-01-01 --to 2024-02-01 --format json
//! meteo watch --interval 120
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod util;

pub use meteo_archive;
pub use meteo_types;
pub use meteo_watch;
