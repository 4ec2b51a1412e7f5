//! Collaborators driven by the watcher.
//!
//! [`ArchiveSync`] keeps the local archive copy up to date and
//! [`StationSource`] reads the station's latest state out of it. Both are
//! implemented by real backends ([`GitSync`](crate::GitSync) and
//! [`Archive`]) and by [`MockStation`](crate::MockStation) for tests.

use async_trait::async_trait;

use meteo_archive::Archive;
use meteo_types::LatestMeasurements;

use crate::error::Result;

/// Keeps a local copy of the remote archive.
///
/// Dropping an in-flight call abandons it; implementations that spawn child
/// processes must not leave them running when that happens.
#[async_trait]
pub trait ArchiveSync: Send + Sync {
    /// Make sure a local copy exists, fetching it if needed.
    ///
    /// A no-op when the copy is already present.
    async fn ensure_local_copy(&self) -> Result<()>;

    /// Fetch the latest changes into the local copy.
    ///
    /// `Ok(false)` reports a pull that did not succeed but left the local copy
    /// usable. Unrecoverable conditions are returned as errors.
    async fn pull_latest(&self) -> Result<bool>;
}

/// Reads the station's latest state.
#[async_trait]
pub trait StationSource: Send + Sync {
    /// The most recent measurement snapshot.
    async fn latest_measurements(&self) -> Result<LatestMeasurements>;

    /// The hardware report text, verbatim.
    async fn hardware_report(&self) -> Result<String>;
}

#[async_trait]
impl StationSource for Archive {
    async fn latest_measurements(&self) -> Result<LatestMeasurements> {
        let archive = self.clone();
        let measurements = tokio::task::spawn_blocking(move || archive.latest_measurements()).await??;
        Ok(measurements)
    }

    async fn hardware_report(&self) -> Result<String> {
        let archive = self.clone();
        let report = tokio::task::spawn_blocking(move || archive.hardware_report()).await??;
        Ok(report)
    }
}
