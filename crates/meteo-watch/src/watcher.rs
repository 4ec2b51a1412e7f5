//! Station watcher.
//!
//! The watcher polls the archive in the background: it sleeps for the poll
//! interval, syncs the local copy, re-reads the latest snapshot and reports it
//! when it is newer than the last one seen.
//!
//! Stopping is cooperative through a [`CancellationToken`]. The loop exits at
//! its next await point, which also abandons an in-flight sync, and never
//! dispatches an event after it has been cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use meteo_types::LatestMeasurements;

use crate::error::{Error, Result};
use crate::events::{CycleOutcome, WatchEvent, WatchEvents};
use crate::traits::{ArchiveSync, StationSource};

/// Default time between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Options for a [`StationWatcher`].
///
/// ```
/// use std::time::Duration;
/// use meteo_watch::WatchOptions;
///
/// let options = WatchOptions::builder()
///     .poll_interval(Duration::from_secs(30))
///     .sync_timeout(Duration::from_secs(120))
///     .max_consecutive_failures(10)
///     .build();
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    /// Sleep between cycles. Default: 60 seconds.
    pub poll_interval: Duration,
    /// Upper bound on a single sync. `None` (default) waits indefinitely.
    pub sync_timeout: Option<Duration>,
    /// Capacity of the event channel. Default: 16 events.
    pub buffer_size: usize,
    /// Stop after this many failed cycles in a row.
    ///
    /// `None` (default) keeps polling through transient errors forever.
    pub max_consecutive_failures: Option<u32>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            sync_timeout: None,
            buffer_size: 16,
            max_consecutive_failures: None,
        }
    }
}

impl WatchOptions {
    pub fn builder() -> WatchOptionsBuilder {
        WatchOptionsBuilder::default()
    }

    /// Options with a specific poll interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            poll_interval: interval,
            ..Default::default()
        }
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig("poll_interval must be > 0".to_string()));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig("buffer_size must be > 0".to_string()));
        }
        if self.sync_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidConfig("sync_timeout must be > 0".to_string()));
        }
        if self.max_consecutive_failures == Some(0) {
            return Err(Error::InvalidConfig(
                "max_consecutive_failures must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`WatchOptions`].
#[derive(Debug, Clone, Default)]
pub struct WatchOptionsBuilder {
    options: WatchOptions,
}

impl WatchOptionsBuilder {
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn sync_timeout(mut self, timeout: Duration) -> Self {
        self.options.sync_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.options.buffer_size = size;
        self
    }

    #[must_use]
    pub fn max_consecutive_failures(mut self, max: u32) -> Self {
        self.options.max_consecutive_failures = Some(max);
        self
    }

    #[must_use]
    pub fn build(self) -> WatchOptions {
        self.options
    }
}

struct RunningWatch {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Polls the station and reports newer snapshots.
///
/// A watcher is either idle or running exactly one background loop.
///
/// The loop remembers the newest observation time it has reported. A snapshot
/// counts as an update only when it is strictly newer than that mark, so a
/// snapshot that moves backwards stays silent until it passes the mark again.
///
/// ```no_run
/// use std::sync::Arc;
/// use meteo_archive::Archive;
/// use meteo_watch::{GitSync, StationWatcher, WatchOptions};
///
/// # async fn run() -> meteo_watch::Result<()> {
/// let root = meteo_archive::default_archive_path();
/// let mut watcher = StationWatcher::new(
///     Arc::new(Archive::new(&root)),
///     Arc::new(GitSync::new(&root)),
///     WatchOptions::default(),
/// )?;
///
/// if let Some(mut events) = watcher.start_watching() {
///     while let Some(event) = events.recv().await {
///         println!("{event:?}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct StationWatcher {
    source: Arc<dyn StationSource>,
    sync: Arc<dyn ArchiveSync>,
    options: WatchOptions,
    running: Option<RunningWatch>,
}

impl std::fmt::Debug for StationWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationWatcher")
            .field("options", &self.options)
            .field("watching", &self.is_watching())
            .finish_non_exhaustive()
    }
}

impl StationWatcher {
    /// Create an idle watcher.
    pub fn new(
        source: Arc<dyn StationSource>,
        sync: Arc<dyn ArchiveSync>,
        options: WatchOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            source,
            sync,
            options,
            running: None,
        })
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Whether a background loop is running.
    ///
    /// Turns false as soon as [`stop_watching`](Self::stop_watching) is called
    /// or the loop gives up after a fatal error.
    pub fn is_watching(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.cancel.is_cancelled() && !r.handle.is_finished())
    }

    /// Start the background loop.
    ///
    /// Returns the event channel, or `None` if the watcher is already running.
    /// Must be called from within a tokio runtime.
    pub fn start_watching(&mut self) -> Option<WatchEvents> {
        if self.is_watching() {
            debug!("Watcher already running, ignoring start");
            return None;
        }

        let (tx, rx) = mpsc::channel(self.options.buffer_size);
        let cancel = CancellationToken::new();
        let task = WatchLoop {
            source: Arc::clone(&self.source),
            sync: Arc::clone(&self.sync),
            options: self.options.clone(),
            events: tx,
            cancel: cancel.clone(),
        };

        info!(
            "Starting station watcher (interval: {}s)",
            self.options.poll_interval.as_secs()
        );
        let handle = tokio::spawn(task.run());
        self.running = Some(RunningWatch { handle, cancel });
        Some(WatchEvents::new(rx))
    }

    /// Ask the background loop to stop.
    ///
    /// Returns `false` if it was not running. The loop exits at its next await
    /// point and sends nothing once it has observed the cancellation.
    pub fn stop_watching(&mut self) -> bool {
        let was_watching = self.is_watching();
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            if was_watching {
                info!("Stopping station watcher");
            }
        }
        was_watching
    }

    /// Stop the background loop and wait for it to exit.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            running.handle.await?;
        }
        Ok(())
    }
}

impl Drop for StationWatcher {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

enum Cycle {
    Updated {
        report: String,
        measurements: LatestMeasurements,
    },
    Unchanged {
        observed_at: DateTime<Utc>,
    },
}

struct WatchLoop {
    source: Arc<dyn StationSource>,
    sync: Arc<dyn ArchiveSync>,
    options: WatchOptions,
    events: mpsc::Sender<WatchEvent>,
    cancel: CancellationToken,
}

impl WatchLoop {
    async fn run(self) {
        let mut last_seen = match self.source.latest_measurements().await {
            Ok(latest) => Some(latest.observed_at),
            Err(e) => {
                debug!("No readable snapshot yet: {}", e);
                None
            }
        };
        let mut consecutive_failures = 0u32;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.options.poll_interval) => {}
            }

            let result = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = self.cycle(last_seen) => result,
            };

            match result {
                Ok(Cycle::Updated {
                    report,
                    measurements,
                }) => {
                    consecutive_failures = 0;
                    let observed_at = measurements.observed_at;
                    last_seen = Some(observed_at);
                    debug!("New snapshot observed at {}", observed_at);

                    if !self.dispatch(WatchEvent::HardwareReport { report }).await
                        || !self.dispatch(WatchEvent::Measurements(measurements)).await
                        || !self
                            .dispatch(WatchEvent::Cycle(CycleOutcome::Updated { observed_at }))
                            .await
                    {
                        break;
                    }
                }
                Ok(Cycle::Unchanged { observed_at }) => {
                    consecutive_failures = 0;
                    debug!("Snapshot unchanged since {}", observed_at);
                    if !self
                        .dispatch(WatchEvent::Cycle(CycleOutcome::Unchanged { observed_at }))
                        .await
                    {
                        break;
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    let limit_reached = self
                        .options
                        .max_consecutive_failures
                        .is_some_and(|max| consecutive_failures >= max);
                    let message = e.to_string();

                    if limit_reached || !e.is_transient() {
                        error!(
                            "Watcher giving up after {} failed cycle(s): {}",
                            consecutive_failures, message
                        );
                        self.dispatch(WatchEvent::Cycle(CycleOutcome::FatalError {
                            message,
                            consecutive_failures,
                        }))
                        .await;
                        break;
                    }

                    if consecutive_failures <= 3 {
                        warn!(
                            "Watch cycle failed: {} (attempt {})",
                            message, consecutive_failures
                        );
                    } else if consecutive_failures == 4 {
                        error!(
                            "Watch cycle failed {} times in a row, will continue trying silently",
                            consecutive_failures
                        );
                    }

                    if !self
                        .dispatch(WatchEvent::Cycle(CycleOutcome::TransientError {
                            message,
                            consecutive_failures,
                        }))
                        .await
                    {
                        break;
                    }
                }
            }
        }

        info!("Station watcher stopped");
    }

    /// Sync, re-read the snapshot and fetch the report if it is newer.
    ///
    /// Both pieces are read before anything is dispatched, so a cycle reports
    /// either everything or nothing.
    async fn cycle(&self, last_seen: Option<DateTime<Utc>>) -> Result<Cycle> {
        self.sync_archive().await?;

        let measurements = self.source.latest_measurements().await?;
        let observed_at = measurements.observed_at;
        if last_seen.is_some_and(|prev| observed_at <= prev) {
            return Ok(Cycle::Unchanged { observed_at });
        }

        let report = self.source.hardware_report().await?;
        Ok(Cycle::Updated {
            report,
            measurements,
        })
    }

    async fn sync_archive(&self) -> Result<()> {
        let sync = async {
            self.sync.ensure_local_copy().await?;
            if !self.sync.pull_latest().await? {
                warn!("Pull did not succeed, reading the local copy as is");
            }
            Ok::<(), Error>(())
        };

        match self.options.sync_timeout {
            Some(limit) => tokio::time::timeout(limit, sync)
                .await
                .map_err(|_| Error::SyncTimeout(limit))?,
            None => sync.await,
        }
    }

    /// Send an event unless the watcher was cancelled.
    ///
    /// Returns `false` when the loop should stop.
    async fn dispatch(&self, event: WatchEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.events.send(event) => {
                if sent.is_err() {
                    debug!("Event receiver dropped, stopping watcher");
                }
                sent.is_ok()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_options_default() {
        let opts = WatchOptions::default();
        assert_eq!(opts.poll_interval, Duration::from_secs(60));
        assert_eq!(opts.buffer_size, 16);
        assert!(opts.sync_timeout.is_none());
        assert!(opts.max_consecutive_failures.is_none());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_watch_options_builder() {
        let opts = WatchOptions::builder()
            .poll_interval(Duration::from_secs(5))
            .buffer_size(4)
            .sync_timeout(Duration::from_secs(30))
            .max_consecutive_failures(3)
            .build();

        assert_eq!(opts.poll_interval, Duration::from_secs(5));
        assert_eq!(opts.buffer_size, 4);
        assert_eq!(opts.sync_timeout, Some(Duration::from_secs(30)));
        assert_eq!(opts.max_consecutive_failures, Some(3));
    }

    #[test]
    fn test_watch_options_with_interval() {
        let opts = WatchOptions::with_interval(Duration::from_millis(500));
        assert_eq!(opts.poll_interval, Duration::from_millis(500));
        assert_eq!(opts.buffer_size, 16);
    }

    #[test]
    fn test_watch_options_validate() {
        let zero_interval = WatchOptions::with_interval(Duration::ZERO);
        assert!(matches!(zero_interval.validate(), Err(Error::InvalidConfig(_))));

        let zero_buffer = WatchOptions::builder().buffer_size(0).build();
        assert!(zero_buffer.validate().is_err());

        let zero_timeout = WatchOptions::builder().sync_timeout(Duration::ZERO).build();
        assert!(zero_timeout.validate().is_err());

        let zero_failures = WatchOptions::builder().max_consecutive_failures(0).build();
        assert!(zero_failures.validate().is_err());
    }
}
