//! Mock station for testing.
//!
//! [`MockStation`] implements both [`ArchiveSync`] and [`StationSource`], so a
//! watcher can be driven without git or an archive on disk.
//!
//! # Features
//!
//! - **Scripted snapshots**: each successful pull publishes the next queued snapshot
//! - **Failure injection**: fail the next `n` syncs, or every report read
//! - **Latency simulation**: delay pulls to exercise timeouts and cancellation

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use meteo_types::{LatestMeasurements, SnapshotRecord};

use crate::error::{Error, Result};
use crate::traits::{ArchiveSync, StationSource};

/// A scripted station for tests.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use meteo_watch::{ArchiveSync, MockStation, StationSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let t2 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 10, 0).unwrap();
/// let station = MockStation::new(t1);
/// station.queue_snapshot(t2).await;
///
/// assert_eq!(station.latest_measurements().await.unwrap().observed_at, t1);
/// station.pull_latest().await.unwrap();
/// assert_eq!(station.latest_measurements().await.unwrap().observed_at, t2);
/// # }
/// ```
#[derive(Debug)]
pub struct MockStation {
    current: RwLock<Option<LatestMeasurements>>,
    queued: RwLock<VecDeque<LatestMeasurements>>,
    report: RwLock<String>,
    pull_count: AtomicU32,
    /// Number of syncs to fail before succeeding again.
    remaining_sync_failures: AtomicU32,
    fail_reports: AtomicBool,
    /// Simulated pull latency in milliseconds (0 = no delay).
    pull_latency_ms: AtomicU64,
}

impl MockStation {
    /// A station whose current snapshot was observed at `observed_at`.
    pub fn new(observed_at: DateTime<Utc>) -> Self {
        Self::with_current(Some(sample_measurements(observed_at)))
    }

    /// A station with no snapshot yet, as before the first clone.
    pub fn empty() -> Self {
        Self::with_current(None)
    }

    fn with_current(current: Option<LatestMeasurements>) -> Self {
        Self {
            current: RwLock::new(current),
            queued: RwLock::new(VecDeque::new()),
            report: RwLock::new("mock hardware report".to_string()),
            pull_count: AtomicU32::new(0),
            remaining_sync_failures: AtomicU32::new(0),
            fail_reports: AtomicBool::new(false),
            pull_latency_ms: AtomicU64::new(0),
        }
    }

    /// Publish a snapshot taken at `observed_at` on the next successful pull.
    pub async fn queue_snapshot(&self, observed_at: DateTime<Utc>) {
        self.queue_measurements(sample_measurements(observed_at)).await;
    }

    /// Publish `measurements` on the next successful pull.
    pub async fn queue_measurements(&self, measurements: LatestMeasurements) {
        self.queued.write().await.push_back(measurements);
    }

    /// Replace the hardware report text.
    pub async fn set_report(&self, report: impl Into<String>) {
        *self.report.write().await = report.into();
    }

    /// Fail the next `count` syncs.
    pub fn set_sync_failures(&self, count: u32) {
        self.remaining_sync_failures.store(count, Ordering::Relaxed);
    }

    /// Make every hardware report read fail.
    pub fn set_report_failure(&self, fail: bool) {
        self.fail_reports.store(fail, Ordering::Relaxed);
    }

    /// Delay each pull by `latency`.
    pub fn set_pull_latency(&self, latency: Duration) {
        self.pull_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of pulls attempted, successful or not.
    pub fn pull_count(&self) -> u32 {
        self.pull_count.load(Ordering::Relaxed)
    }

    fn take_sync_failure(&self) -> bool {
        self.remaining_sync_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ArchiveSync for MockStation {
    async fn ensure_local_copy(&self) -> Result<()> {
        Ok(())
    }

    async fn pull_latest(&self) -> Result<bool> {
        self.pull_count.fetch_add(1, Ordering::Relaxed);

        let latency = self.pull_latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.take_sync_failure() {
            return Err(Error::SyncFailed("mock sync failure".to_string()));
        }

        if let Some(next) = self.queued.write().await.pop_front() {
            *self.current.write().await = Some(next);
        }
        Ok(true)
    }
}

#[async_trait]
impl StationSource for MockStation {
    async fn latest_measurements(&self) -> Result<LatestMeasurements> {
        self.current.read().await.clone().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "mock station has no snapshot",
            ))
        })
    }

    async fn hardware_report(&self) -> Result<String> {
        if self.fail_reports.load(Ordering::Relaxed) {
            return Err(Error::Io(std::io::Error::other("mock report failure")));
        }
        Ok(self.report.read().await.clone())
    }
}

/// Plausible measurements observed at `observed_at`.
pub fn sample_measurements(observed_at: DateTime<Utc>) -> LatestMeasurements {
    let record = SnapshotRecord {
        observed_at,
        temperature: 18.4,
        humidity: 62.0,
        pressure: 1012.8,
        pm10: 14.0,
        pm25: 8.5,
        smoke: 2.0,
    };
    LatestMeasurements::from_record(&record, &PathBuf::from("last.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn test_empty_station_has_no_snapshot() {
        let station = MockStation::empty();
        assert!(matches!(station.latest_measurements().await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_pull_publishes_queued_snapshots_in_order() {
        let station = MockStation::new(at(0));
        station.queue_snapshot(at(1)).await;
        station.queue_snapshot(at(2)).await;

        assert!(station.pull_latest().await.unwrap());
        assert_eq!(station.latest_measurements().await.unwrap().observed_at, at(1));
        assert!(station.pull_latest().await.unwrap());
        assert!(station.pull_latest().await.unwrap());
        assert_eq!(station.latest_measurements().await.unwrap().observed_at, at(2));
        assert_eq!(station.pull_count(), 3);
    }

    #[tokio::test]
    async fn test_sync_failures_then_success() {
        let station = MockStation::new(at(0));
        station.queue_snapshot(at(5)).await;
        station.set_sync_failures(2);

        assert!(station.pull_latest().await.is_err());
        assert!(station.pull_latest().await.is_err());
        assert!(station.pull_latest().await.is_ok());
        assert_eq!(station.latest_measurements().await.unwrap().observed_at, at(5));
    }

    #[tokio::test]
    async fn test_report_failure_injection() {
        let station = MockStation::new(at(0));
        station.set_report("fan ok").await;
        assert_eq!(station.hardware_report().await.unwrap(), "fan ok");

        station.set_report_failure(true);
        assert!(station.hardware_report().await.is_err());
    }
}
