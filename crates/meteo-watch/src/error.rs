//! Error types for meteo-watch.
//!
//! # Error Classification
//!
//! The watcher keeps polling after a transient error and stops after a fatal
//! one. [`Error::is_transient`] decides which is which:
//!
//! | Error | Transient | Typical cause |
//! |-------|-----------|---------------|
//! | [`Error::Archive`] | Yes, except configuration errors | Snapshot rewritten mid-read, archive not cloned yet |
//! | [`Error::SyncFailed`] | Yes | Network down, remote unreachable |
//! | [`Error::SyncTimeout`] | Yes | Slow remote |
//! | [`Error::Io`] | Yes | Filesystem hiccup |
//! | [`Error::Task`] | No | A background task panicked |
//! | [`Error::InvalidConfig`] | No | Fix configuration and restart |
//!
//! Regardless of classification, a watcher configured with
//! `max_consecutive_failures` stops once that many cycles fail in a row.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while syncing or watching the archive.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Reading the local archive failed.
    #[error(transparent)]
    Archive(#[from] meteo_archive::Error),

    /// The sync collaborator reported an unrecoverable failure.
    #[error("Sync failed: {0}")]
    SyncFailed(String),

    /// The sync did not finish within the configured limit.
    #[error("Sync timed out after {0:?}")]
    SyncTimeout(Duration),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A blocking read task panicked or was aborted.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether a later cycle may succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Archive(inner) => !matches!(
                inner,
                meteo_archive::Error::UnknownTimeZone(_) | meteo_archive::Error::InvalidPeriod { .. }
            ),
            Error::SyncFailed(_) | Error::SyncTimeout(_) | Error::Io(_) => true,
            Error::Task(_) | Error::InvalidConfig(_) => false,
        }
    }
}

/// Result type for meteo-watch operations.
pub type Result<T> = std::result::Result<T, Error>;
