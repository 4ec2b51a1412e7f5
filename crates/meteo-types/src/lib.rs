//! Shared data model for the Cocito weather station archive.
//!
//! This crate provides the types used by both the archive query engine
//! (meteo-archive) and the station watcher (meteo-watch).
//!
//! # Features
//!
//! - The [`DataType`] catalogue of measurement kinds and their metadata
//! - [`Value`] data points with provenance
//! - [`LatestMeasurements`] built from the station's snapshot record
//! - Error types for data parsing
//!
//! # Example
//!
//! ```
//! use meteo_types::DataType;
//!
//! let dt: DataType = "pm10".parse()?;
//! assert_eq!(dt.unit(), "µg/m³");
//! # Ok::<(), meteo_types::ParseError>(())
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{DataType, LatestMeasurements, SnapshotRecord, Value};
