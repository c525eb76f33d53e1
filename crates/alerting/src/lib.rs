//! Driver Alerting
//!
//! In-cabin alert state machines for the hazard notification pipeline:
//! - Emergency brake alert (edge-triggered on close-range in-lane hazards)
//! - Lane hazard alert (grace-delayed dismissal to avoid flicker)
//!
//! Rendering and audio are external seams ([`AlertSink`], [`AlarmSound`]);
//! each machine owns at most one live [`AlertHandle`].

mod brake;
mod lane;
mod sink;

#[cfg(test)]
pub(crate) mod test_support;

pub use brake::{BrakeAlert, BrakeConfig};
pub use lane::{LaneAlert, LaneAlertState, LaneConfig};
pub use sink::{
    AlarmSound, AlertHandle, AlertRequest, AlertSeverity, AlertSink, PlaybackError,
    TracingAlarmSound, TracingAlertSink,
};
