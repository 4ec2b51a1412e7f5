//! Watcher events and listener adapter.
//!
//! A running watcher reports through a bounded channel. Each cycle that finds
//! a newer snapshot yields, in this order:
//!
//! 1. [`WatchEvent::HardwareReport`]
//! 2. [`WatchEvent::Measurements`]
//! 3. [`WatchEvent::Cycle`] with [`CycleOutcome::Updated`]
//!
//! Every other cycle yields a single [`WatchEvent::Cycle`].

use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use meteo_types::LatestMeasurements;

/// Something the watcher observed.
///
/// All events are serializable for logging and piping to other tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum WatchEvent {
    /// The hardware report accompanying a newer snapshot.
    HardwareReport { report: String },
    /// A snapshot newer than any seen before.
    Measurements(LatestMeasurements),
    /// How a poll cycle ended.
    Cycle(CycleOutcome),
}

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// A newer snapshot was found and dispatched.
    Updated { observed_at: DateTime<Utc> },
    /// The snapshot was not newer than the last one seen.
    Unchanged { observed_at: DateTime<Utc> },
    /// The cycle failed; the watcher keeps polling.
    TransientError {
        message: String,
        consecutive_failures: u32,
    },
    /// The cycle failed and the watcher stopped.
    FatalError {
        message: String,
        consecutive_failures: u32,
    },
}

impl CycleOutcome {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            CycleOutcome::TransientError { .. } | CycleOutcome::FatalError { .. }
        )
    }

    /// Whether the watcher stopped after this cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CycleOutcome::FatalError { .. })
    }
}

/// Callback interface for code that prefers listeners to a channel.
///
/// Drive it with [`WatchEvents::forward_to`]. Calls arrive one at a time, in
/// event order.
pub trait StationListener: Send {
    /// A newer snapshot arrived; this is its hardware report.
    fn on_latest_hardware_report(&mut self, report: &str);

    /// A newer snapshot arrived.
    fn on_latest_measurements(&mut self, measurements: &LatestMeasurements);

    /// A cycle failed. `fatal` is set when the watcher gave up.
    fn on_cycle_error(&mut self, message: &str, fatal: bool) {
        let _ = (message, fatal);
    }
}

/// Receiving end of a running watcher.
///
/// The stream ends once the watcher stops, whether it was stopped or gave up.
#[derive(Debug)]
pub struct WatchEvents {
    receiver: mpsc::Receiver<WatchEvent>,
}

impl WatchEvents {
    pub(crate) fn new(receiver: mpsc::Receiver<WatchEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the next event. `None` once the watcher has stopped.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.receiver.recv().await
    }

    /// Take an event if one is ready.
    pub fn try_recv(&mut self) -> Option<WatchEvent> {
        self.receiver.try_recv().ok()
    }

    /// Dispatch every event to `listener` until the watcher stops.
    pub async fn forward_to<L>(mut self, listener: &mut L)
    where
        L: StationListener + ?Sized,
    {
        while let Some(event) = self.recv().await {
            match event {
                WatchEvent::HardwareReport { report } => listener.on_latest_hardware_report(&report),
                WatchEvent::Measurements(measurements) => {
                    listener.on_latest_measurements(&measurements)
                }
                WatchEvent::Cycle(CycleOutcome::TransientError { message, .. }) => {
                    listener.on_cycle_error(&message, false)
                }
                WatchEvent::Cycle(CycleOutcome::FatalError { message, .. }) => {
                    listener.on_cycle_error(&message, true)
                }
                WatchEvent::Cycle(_) => {}
            }
        }
    }
}

impl Stream for WatchEvents {
    type Item = WatchEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cycle_outcome_serialization() {
        let outcome = CycleOutcome::TransientError {
            message: "offline".into(),
            consecutive_failures: 2,
        };
        let json = serde_json::to_value(WatchEvent::Cycle(outcome)).unwrap();
        assert_eq!(json["event"], "cycle");
        assert_eq!(json["outcome"], "transient_error");
        assert_eq!(json["consecutive_failures"], 2);
    }

    #[test]
    fn test_hardware_report_serialization() {
        let event = WatchEvent::HardwareReport {
            report: "fan ok".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"hardware_report","report":"fan ok"}"#);
        let back: WatchEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_outcome_predicates() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(!CycleOutcome::Updated { observed_at: at }.is_error());
        assert!(!CycleOutcome::Unchanged { observed_at: at }.is_fatal());
        let fatal = CycleOutcome::FatalError {
            message: "gave up".into(),
            consecutive_failures: 5,
        };
        assert!(fatal.is_error());
        assert!(fatal.is_fatal());
    }
}
