//! Lane hazard alert
//!
//! Warning alert while the driver-lane hazard count is non-zero. Dismissal
//! waits for a grace window of continuous zero counts so a detector count
//! oscillating near zero does not flicker the alert.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::sink::{AlarmSound, AlertHandle, AlertRequest, AlertSeverity, AlertSink};

/// Lane alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Continuous zero-count time required before dismissal (seconds)
    pub grace_secs: u64,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self { grace_secs: 3 }
    }
}

/// Lane alert lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneAlertState {
    Inactive,
    Active,
    PendingDismiss,
}

/// Lane hazard notifier
pub struct LaneAlert {
    grace: Duration,
    handle: Option<AlertHandle>,
    /// Deadline after which a continuous zero count closes the alert
    dismiss_deadline: Option<Instant>,
}

impl LaneAlert {
    /// Create a new lane alert machine
    pub fn new(config: LaneConfig) -> Self {
        Self {
            grace: Duration::from_secs(config.grace_secs),
            handle: None,
            dismiss_deadline: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LaneAlertState {
        match (self.handle, self.dismiss_deadline) {
            (None, _) => LaneAlertState::Inactive,
            (Some(_), None) => LaneAlertState::Active,
            (Some(_), Some(_)) => LaneAlertState::PendingDismiss,
        }
    }

    /// Apply the driver-lane hazard count from one transport message
    pub fn on_signal(
        &mut self,
        count: u32,
        now: Instant,
        sink: &mut dyn AlertSink,
        sound: &mut dyn AlarmSound,
    ) {
        if count > 0 {
            if self.handle.is_none() {
                if let Err(e) = sound.play() {
                    warn!("Lane alarm sound failed: {}", e);
                }
                let handle = sink.show(AlertRequest {
                    severity: AlertSeverity::Warning,
                    message: "Road hazard detected in your lane! Reducing speed...".to_string(),
                    auto_close: None,
                });
                self.handle = Some(handle);
                info!("Lane hazard alert opened (count {})", count);
            }
            if self.dismiss_deadline.take().is_some() {
                debug!("Lane hazard dismiss cancelled, count back to {}", count);
            }
        } else if self.handle.is_some() && self.dismiss_deadline.is_none() {
            self.dismiss_deadline = Some(now + self.grace);
            debug!("Lane hazard count at zero, dismissing after grace window");
        }
    }

    /// Check the dismiss deadline against the current time
    pub fn on_tick(&mut self, now: Instant, sink: &mut dyn AlertSink, sound: &mut dyn AlarmSound) {
        let Some(deadline) = self.dismiss_deadline else {
            return;
        };
        if now < deadline {
            return;
        }

        if let Some(handle) = self.handle.take() {
            sound.stop();
            sink.dismiss(handle);
            info!("Lane hazard alert closed after grace window");
        }
        self.dismiss_deadline = None;
    }

    /// Release the alert and sound on teardown
    pub fn shutdown(&mut self, sink: &mut dyn AlertSink, sound: &mut dyn AlarmSound) {
        if let Some(handle) = self.handle.take() {
            sound.stop();
            sink.dismiss(handle);
        }
        self.dismiss_deadline = None;
    }
}

impl Default for LaneAlert {
    fn default() -> Self {
        Self::new(LaneConfig::default())
    }
}
