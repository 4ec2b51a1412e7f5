//! Error types for data parsing in meteo-types.

use thiserror::Error;

/// Errors that can occur when interpreting station data.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The text does not name any known measurement kind.
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    /// A snapshot field was present but unusable.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using meteo-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
