//! Battery-removal protection
//!
//! A loose or missing battery makes the charger bounce between charge
//! states, raising CHARGE_STATUS_CHANGE over and over. The detector keeps
//! the timestamps of the last N such events; when all N fit inside the
//! threshold it disables charging, tells subscribers and records the action.

use crate::config::FlapConfig;
use crate::events::{EventCode, EventSet};
use crate::history::HistorySink;
use crate::logging::{StructuredLogger, get_logger};
use crate::notify::Notifier;
use crate::writer::ValidatedWriter;
use std::collections::VecDeque;

pub const ALERT_CODE: &str = "BATTERY_REMOVED_PROTECTION";
pub const HISTORY_DISABLED: &str = "AUTO_PROTECTION: Charging Disabled due to rapid toggling";
pub const HISTORY_DISABLE_FAILED: &str =
    "AUTO_PROTECTION: Failed to disable charging after rapid toggling";

/// Fixed-capacity ring of event timestamps in milliseconds
#[derive(Debug, Clone)]
pub struct FlapWindow {
    timestamps: VecDeque<u64>,
    capacity: usize,
}

impl FlapWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a timestamp, evicting the oldest when full
    pub fn push(&mut self, now_ms: u64) {
        if self.timestamps.len() == self.capacity {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(now_ms);
    }

    pub fn is_full(&self) -> bool {
        self.timestamps.len() == self.capacity
    }

    /// Newest minus oldest
    pub fn span(&self) -> Option<u64> {
        let oldest = self.timestamps.front()?;
        let newest = self.timestamps.back()?;
        Some(newest.saturating_sub(*oldest))
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlapState {
    /// Collecting charge-status changes
    Armed,
    /// Window filled inside the threshold; protective write pending
    Tripped,
}

/// Outcome of one protective action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripReport {
    /// Span of the window that tripped
    pub span_ms: u64,
    /// Whether `EN_CHG=0` reached the chip
    pub charging_disabled: bool,
}

pub struct FlapDetector {
    window: FlapWindow,
    threshold_ms: u64,
    state: FlapState,
    trips: u64,
    logger: StructuredLogger,
}

impl FlapDetector {
    pub fn new(window_size: usize, threshold_ms: u64) -> Self {
        Self {
            window: FlapWindow::new(window_size.max(1)),
            threshold_ms,
            state: FlapState::Armed,
            trips: 0,
            logger: get_logger("flap"),
        }
    }

    pub fn from_config(config: &FlapConfig) -> Self {
        Self::new(config.window_size, config.threshold_ms)
    }

    pub fn state(&self) -> FlapState {
        self.state
    }

    pub fn window(&self) -> &FlapWindow {
        &self.window
    }

    /// Number of protective actions taken so far
    pub fn trip_count(&self) -> u64 {
        self.trips
    }

    /// Feed one decoded event set; returns true when the detector trips
    ///
    /// Sets without CHARGE_STATUS_CHANGE leave the window untouched.
    pub fn observe(&mut self, events: &EventSet, now_ms: u64) -> bool {
        if self.state != FlapState::Armed || !events.contains(EventCode::ChargeStatusChange) {
            return false;
        }
        self.window.push(now_ms);
        if !self.window.is_full() {
            return false;
        }
        match self.window.span() {
            Some(span) if span < self.threshold_ms => {
                self.state = FlapState::Tripped;
                true
            }
            _ => false,
        }
    }

    /// Return to collecting with an empty window
    pub fn rearm(&mut self) {
        self.window.clear();
        self.state = FlapState::Armed;
    }

    /// Observe an event set and carry out the protective action on a trip
    pub async fn process(
        &mut self,
        events: &EventSet,
        now_ms: u64,
        writer: &mut ValidatedWriter,
        notifier: &dyn Notifier,
        history: &mut dyn HistorySink,
    ) -> Option<TripReport> {
        if !self.observe(events, now_ms) {
            return None;
        }
        let span_ms = self.window.span().unwrap_or_default();
        self.logger.warn(&format!(
            "Battery removal suspected: {} charge-status changes in {} ms",
            self.window.len(),
            span_ms
        ));

        let charging_disabled = match writer.write("EN_CHG", 0).await {
            Ok(()) => {
                self.logger.warn("Protection activated: charging disabled (EN_CHG=0)");
                true
            }
            Err(e) => {
                self.logger.error(&format!("Protection failed: could not disable charging: {}", e));
                false
            }
        };

        let (message, record) = if charging_disabled {
            (
                "Rapid charge status toggling detected! Charging disabled.",
                HISTORY_DISABLED,
            )
        } else {
            (
                "Rapid charge status toggling detected! Failed to disable charging.",
                HISTORY_DISABLE_FAILED,
            )
        };
        let alert = serde_json::json!({ "alert": ALERT_CODE, "message": message });
        notifier.broadcast(&alert.to_string());
        history.append(record, now_ms);

        self.trips += 1;
        self.rearm();
        Some(TripReport {
            span_ms,
            charging_disabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge_change() -> EventSet {
        EventSet::single(EventCode::ChargeStatusChange)
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut w = FlapWindow::new(3);
        for t in [10, 20, 30, 40] {
            w.push(t);
        }
        assert!(w.is_full());
        assert_eq!(w.span(), Some(20));
    }

    #[test]
    fn test_trips_on_fast_burst() {
        let mut d = FlapDetector::new(10, 4000);
        let tripped: Vec<bool> = (0..10).map(|i| d.observe(&charge_change(), i * 100)).collect();
        assert_eq!(tripped.iter().filter(|t| **t).count(), 1);
        assert!(tripped[9]);
        assert_eq!(d.state(), FlapState::Tripped);
    }

    #[test]
    fn test_slow_changes_never_trip() {
        let mut d = FlapDetector::new(10, 4000);
        for i in 0..30 {
            assert!(!d.observe(&charge_change(), i * 1000));
        }
        assert_eq!(d.state(), FlapState::Armed);
    }

    #[test]
    fn test_span_equal_to_threshold_does_not_trip() {
        let mut d = FlapDetector::new(2, 4000);
        assert!(!d.observe(&charge_change(), 0));
        assert!(!d.observe(&charge_change(), 4000));
        assert!(d.observe(&charge_change(), 7999));
    }

    #[test]
    fn test_other_events_ignored() {
        let mut d = FlapDetector::new(10, 4000);
        let noise: EventSet = [EventCode::AdcDone, EventCode::VbusPresenceChange]
            .into_iter()
            .collect();
        for i in 0..20 {
            assert!(!d.observe(&noise, i));
        }
        assert!(d.window().is_empty());
    }

    #[test]
    fn test_rearm_requires_full_window_again() {
        let mut d = FlapDetector::new(10, 4000);
        for i in 0..10 {
            d.observe(&charge_change(), i * 100);
        }
        d.rearm();
        assert!(d.window().is_empty());
        for i in 0..9 {
            assert!(!d.observe(&charge_change(), 1000 + i * 10));
        }
        assert!(d.observe(&charge_change(), 1100));
    }
}
