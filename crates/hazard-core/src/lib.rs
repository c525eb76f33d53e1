//! Hazard Core
//!
//! Shared data model for the road-hazard notification pipeline:
//! - Detected hazard observations and classes
//! - Transport wire message schema
//! - Geographic position math (haversine, dedupe epsilon)
//! - Report records for the outbound notification queue

pub mod estimate;
pub mod geo;
pub mod message;
pub mod report;

pub use estimate::DistanceEstimator;
pub use geo::Position;
pub use message::{HazardClass, HazardObservation, LaneHazardSignal, TransportMessage};
pub use report::{HazardReport, PendingReport};

use thiserror::Error;

/// Hazard data errors
#[derive(Debug, Error)]
pub enum HazardError {
    /// Inbound telemetry that does not parse as the wire schema
    #[error("Malformed transport message: {0}")]
    MalformedMessage(#[from] serde_json::Error),
}
