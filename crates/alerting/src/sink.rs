//! Alert display and alarm sound seams

use std::time::Duration;

use thiserror::Error;
use tracing::info;

/// Sound playback errors.
///
/// Playback failures are logged and never stop an alert from showing.
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Audio device unavailable: {0}")]
    Device(String),

    #[error("Playback rejected: {0}")]
    Rejected(String),
}

/// Opaque reference to one visible alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertHandle(pub u64);

/// Alert severity, mapped to styling by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    /// Time-limited heads-up (nearby hazards)
    Advisory,
    /// Persistent warning (lane hazards)
    Warning,
    /// Emergency (immediate braking)
    Critical,
    /// Positive acknowledgment (report delivered)
    Confirmation,
}

/// A request to display one alert
#[derive(Debug, Clone)]
pub struct AlertRequest {
    pub severity: AlertSeverity,
    pub message: String,
    /// `None` keeps the alert on screen until explicitly dismissed
    pub auto_close: Option<Duration>,
}

/// Rendering seam for on-screen alerts
pub trait AlertSink {
    /// Display an alert and return its handle
    fn show(&mut self, request: AlertRequest) -> AlertHandle;

    /// Remove a previously shown alert
    fn dismiss(&mut self, handle: AlertHandle);
}

/// Looping alarm sound seam
pub trait AlarmSound {
    /// Start playback
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Stop playback and rewind to the start
    fn stop(&mut self);
}

/// Headless [`AlertSink`] that logs alerts instead of rendering them
#[derive(Debug, Default)]
pub struct TracingAlertSink {
    next_id: u64,
}

impl AlertSink for TracingAlertSink {
    fn show(&mut self, request: AlertRequest) -> AlertHandle {
        self.next_id += 1;
        info!(
            "[alert {}] {:?}: {}",
            self.next_id, request.severity, request.message
        );
        AlertHandle(self.next_id)
    }

    fn dismiss(&mut self, handle: AlertHandle) {
        info!("[alert {}] dismissed", handle.0);
    }
}

/// Headless [`AlarmSound`] that logs playback transitions
#[derive(Debug)]
pub struct TracingAlarmSound {
    label: &'static str,
}

impl TracingAlarmSound {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl AlarmSound for TracingAlarmSound {
    fn play(&mut self) -> Result<(), PlaybackError> {
        info!("[sound {}] playing", self.label);
        Ok(())
    }

    fn stop(&mut self) {
        info!("[sound {}] stopped", self.label);
    }
}
