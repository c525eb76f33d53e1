//! Emergency brake alert
//!
//! Edge-triggered alert for close-range living obstacles in the driver's
//! lane. The alert is open exactly while the latest frame's critical set is
//! non-empty; there is no grace period.

use hazard_core::HazardObservation;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::sink::{AlarmSound, AlertHandle, AlertRequest, AlertSeverity, AlertSink};

/// Brake alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrakeConfig {
    /// Distance below which an in-lane hazard is critical (meters)
    pub critical_distance_m: f64,
}

impl Default for BrakeConfig {
    fn default() -> Self {
        Self {
            critical_distance_m: 12.0,
        }
    }
}

/// Emergency brake notifier
pub struct BrakeAlert {
    config: BrakeConfig,
    handle: Option<AlertHandle>,
}

impl BrakeAlert {
    /// Create a new brake alert machine
    pub fn new(config: BrakeConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    /// Re-evaluate against one detection frame.
    ///
    /// Opens the alert on the first frame with a non-empty critical set and
    /// closes it on the first frame without one.
    pub fn on_frame(
        &mut self,
        observations: &[HazardObservation],
        sink: &mut dyn AlertSink,
        sound: &mut dyn AlarmSound,
    ) {
        let critical = observations
            .iter()
            .filter(|o| self.is_critical(o))
            .count();

        match (critical > 0, self.handle) {
            (true, None) => {
                // Playback failure is non-fatal; the alert shows regardless
                if let Err(e) = sound.play() {
                    warn!("Emergency brake sound failed: {}", e);
                }
                let handle = sink.show(AlertRequest {
                    severity: AlertSeverity::Critical,
                    message: "EMERGENCY! Applying emergency brake!".to_string(),
                    auto_close: None,
                });
                self.handle = Some(handle);
                info!("Emergency brake alert opened ({} critical hazards)", critical);
            }
            (false, Some(handle)) => {
                sound.stop();
                sink.dismiss(handle);
                self.handle = None;
                info!("Emergency brake alert cleared");
            }
            _ => {}
        }
    }

    fn is_critical(&self, observation: &HazardObservation) -> bool {
        observation.class.is_living_obstacle()
            && observation.distance < self.config.critical_distance_m
            && observation.in_driver_lane
    }

    /// Whether the alert is currently open
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Release the alert and sound on teardown
    pub fn shutdown(&mut self, sink: &mut dyn AlertSink, sound: &mut dyn AlarmSound) {
        if let Some(handle) = self.handle.take() {
            sound.stop();
            sink.dismiss(handle);
        }
    }
}

impl Default for BrakeAlert {
    fn default() -> Self {
        Self::new(BrakeConfig::default())
    }
}
