//! Transport wire message schema

use serde::{Deserialize, Serialize};

use crate::HazardError;

/// Classes of hazard the upstream detector reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardClass {
    Person,
    Dog,
    Cow,
    Pothole,
    Speedbump,
    #[serde(other)]
    Other,
}

impl HazardClass {
    /// True for classes that trigger the immediate brake alert
    pub fn is_living_obstacle(&self) -> bool {
        matches!(self, HazardClass::Person | HazardClass::Dog | HazardClass::Cow)
    }
}

/// One detected hazard with its estimated range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardObservation {
    /// Detected class
    pub class: HazardClass,

    /// Estimated distance from the vehicle (meters)
    pub distance: f64,

    /// Whether the detection falls inside the driver's lane
    #[serde(rename = "inDriverLane")]
    pub in_driver_lane: bool,
}

/// Aggregate driver-lane hazard signal carried by one transport message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneHazardSignal {
    /// Number of hazards currently in the driver's lane
    pub count: u32,

    /// Dominant hazard type label, empty when none
    pub hazard_type: String,
}

/// JSON telemetry message from the live transport.
///
/// Binary transport frames are opaque image payloads and never reach this
/// schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportMessage {
    /// Dominant hazard type label, empty when none
    #[serde(default)]
    pub hazard_type: String,

    /// Number of hazards in the driver's lane
    pub driver_lane_hazard_count: u32,

    /// Per-detection observations with estimated distances
    #[serde(default)]
    pub hazard_distances: Vec<HazardObservation>,
}

impl TransportMessage {
    /// Parse one telemetry payload.
    ///
    /// Callers drop malformed messages and leave prior alert state
    /// unchanged.
    pub fn parse(raw: &str) -> Result<Self, HazardError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The aggregate lane signal carried by this message
    pub fn lane_signal(&self) -> LaneHazardSignal {
        LaneHazardSignal {
            count: self.driver_lane_hazard_count,
            hazard_type: self.hazard_type.clone(),
        }
    }
}
