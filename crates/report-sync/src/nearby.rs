//! Nearby hazard advisory
//!
//! Evaluates polled hazard reports against the current position and raises
//! a short auto-dismissing advisory. After dismissal the advisory stays
//! re-armed for a window so the next poll tick does not immediately
//! re-trigger it.

use std::time::{Duration, Instant};

use alerting::{AlertHandle, AlertRequest, AlertSeverity, AlertSink};
use hazard_core::{HazardReport, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Nearby advisory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyConfig {
    /// Interval between report polls (seconds)
    pub poll_interval_secs: u64,

    /// Radius within which a report counts as nearby (kilometers)
    pub radius_km: f64,

    /// How long the advisory stays on screen (seconds)
    pub advisory_secs: u64,

    /// Re-arm window after dismissal (seconds)
    pub rearm_secs: u64,
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            radius_km: 0.1,
            advisory_secs: 7,
            rearm_secs: 30,
        }
    }
}

/// Nearby hazard notifier
pub struct NearbyAdvisory {
    config: NearbyConfig,
    handle: Option<AlertHandle>,
    shown_at: Option<Instant>,
    rearm_until: Option<Instant>,
}

impl NearbyAdvisory {
    /// Create a new advisory machine
    pub fn new(config: NearbyConfig) -> Self {
        Self {
            config,
            handle: None,
            shown_at: None,
            rearm_until: None,
        }
    }

    /// Evaluate one poll result against the current position.
    ///
    /// Returns the number of reports within the radius.
    pub fn evaluate(
        &mut self,
        position: &Position,
        reports: &[HazardReport],
        now: Instant,
        sink: &mut dyn AlertSink,
    ) -> usize {
        let nearby = reports
            .iter()
            .filter(|report| position.distance_km(&report.location) <= self.config.radius_km)
            .count();

        if nearby == 0 || self.handle.is_some() {
            return nearby;
        }
        if let Some(until) = self.rearm_until {
            if now < until {
                debug!("Nearby advisory suppressed, re-arm window open");
                return nearby;
            }
        }

        let handle = sink.show(AlertRequest {
            severity: AlertSeverity::Advisory,
            message: "Drive carefully! Potholes were reported nearby.".to_string(),
            auto_close: Some(Duration::from_secs(self.config.advisory_secs)),
        });
        self.handle = Some(handle);
        self.shown_at = Some(now);
        info!(
            "Nearby hazard advisory shown ({} reports within {} km)",
            nearby, self.config.radius_km
        );
        nearby
    }

    /// Retire the advisory once its display window has elapsed.
    ///
    /// The renderer auto-closes the toast itself; this transition starts
    /// the re-arm window from the dismissal time.
    pub fn on_tick(&mut self, now: Instant) {
        let Some(shown_at) = self.shown_at else {
            return;
        };
        let dismissed_at = shown_at + Duration::from_secs(self.config.advisory_secs);
        if now < dismissed_at {
            return;
        }

        self.handle = None;
        self.shown_at = None;
        self.rearm_until = Some(dismissed_at + Duration::from_secs(self.config.rearm_secs));
        debug!(
            "Nearby advisory dismissed, re-armed for {}s",
            self.config.rearm_secs
        );
    }

    /// Whether the advisory is currently on screen
    pub fn is_showing(&self) -> bool {
        self.handle.is_some()
    }

    /// Release the advisory on teardown
    pub fn shutdown(&mut self, sink: &mut dyn AlertSink) {
        if let Some(handle) = self.handle.take() {
            sink.dismiss(handle);
        }
        self.shown_at = None;
        self.rearm_until = None;
    }
}

impl Default for NearbyAdvisory {
    fn default() -> Self {
        Self::new(NearbyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every show/dismiss call
    #[derive(Debug, Default)]
    struct RecordingSink {
        shown: Vec<AlertRequest>,
        dismissed: Vec<AlertHandle>,
        next_id: u64,
    }

    impl AlertSink for RecordingSink {
        fn show(&mut self, request: AlertRequest) -> AlertHandle {
            self.next_id += 1;
            self.shown.push(request);
            AlertHandle(self.next_id)
        }

        fn dismiss(&mut self, handle: AlertHandle) {
            self.dismissed.push(handle);
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn report_at(lat: f64, lng: f64) -> HazardReport {
        HazardReport {
            location: Position::new(lat, lng),
            hazard_type: "pothole".to_string(),
            severity: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_nearby_report_shows_advisory() {
        let mut advisory = NearbyAdvisory::default();
        let mut sink = RecordingSink::default();
        let position = Position::new(31.2500, 34.7900);
        // ~44 m north of the vehicle
        let reports = vec![report_at(31.2504, 34.7900)];

        let count = advisory.evaluate(&position, &reports, Instant::now(), &mut sink);
        assert_eq!(count, 1);
        assert!(advisory.is_showing());
        assert_eq!(sink.shown.len(), 1);
        assert_eq!(sink.shown[0].auto_close, Some(secs(7)));
    }

    #[test]
    fn test_far_reports_do_not_trigger() {
        let mut advisory = NearbyAdvisory::default();
        let mut sink = RecordingSink::default();
        let position = Position::new(31.2500, 34.7900);
        // ~220 m away, outside the 100 m radius
        let reports = vec![report_at(31.2520, 34.7900)];

        let count = advisory.evaluate(&position, &reports, Instant::now(), &mut sink);
        assert_eq!(count, 0);
        assert!(!advisory.is_showing());
        assert!(sink.shown.is_empty());
    }

    #[test]
    fn test_no_retrigger_inside_rearm_window() {
        let mut advisory = NearbyAdvisory::default();
        let mut sink = RecordingSink::default();
        let position = Position::new(31.2500, 34.7900);
        let reports = vec![report_at(31.2504, 34.7900)];
        let t0 = Instant::now();

        advisory.evaluate(&position, &reports, t0, &mut sink);
        assert_eq!(sink.shown.len(), 1);

        // Auto-close lands at t0+7; the poll at t0+30 is inside the
        // 30 s re-arm window that runs until t0+37
        advisory.on_tick(t0 + secs(7));
        assert!(!advisory.is_showing());

        advisory.evaluate(&position, &reports, t0 + secs(30), &mut sink);
        assert_eq!(sink.shown.len(), 1);

        // The next poll after the window re-triggers
        advisory.evaluate(&position, &reports, t0 + secs(60), &mut sink);
        assert_eq!(sink.shown.len(), 2);
    }

    #[test]
    fn test_no_duplicate_while_showing() {
        let mut advisory = NearbyAdvisory::default();
        let mut sink = RecordingSink::default();
        let position = Position::new(31.2500, 34.7900);
        let reports = vec![report_at(31.2504, 34.7900)];
        let t0 = Instant::now();

        advisory.evaluate(&position, &reports, t0, &mut sink);
        advisory.evaluate(&position, &reports, t0 + secs(2), &mut sink);
        assert_eq!(sink.shown.len(), 1);
    }

    #[test]
    fn test_tick_before_display_window_keeps_advisory() {
        let mut advisory = NearbyAdvisory::default();
        let mut sink = RecordingSink::default();
        let position = Position::new(31.2500, 34.7900);
        let reports = vec![report_at(31.2504, 34.7900)];
        let t0 = Instant::now();

        advisory.evaluate(&position, &reports, t0, &mut sink);
        advisory.on_tick(t0 + secs(3));
        assert!(advisory.is_showing());
    }

    #[test]
    fn test_shutdown_dismisses_open_advisory() {
        let mut advisory = NearbyAdvisory::default();
        let mut sink = RecordingSink::default();
        let position = Position::new(31.2500, 34.7900);
        let reports = vec![report_at(31.2504, 34.7900)];

        advisory.evaluate(&position, &reports, Instant::now(), &mut sink);
        advisory.shutdown(&mut sink);

        assert!(!advisory.is_showing());
        assert_eq!(sink.dismissed.len(), 1);
    }
}
