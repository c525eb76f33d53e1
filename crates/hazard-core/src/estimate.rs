//! Monocular distance estimation
//!
//! The upstream detector produces the wire `distance` field with the
//! apparent-size method: `distance = known_width * focal_length / bbox_width`.
//! Kept here so tooling and tests can reproduce wire distances.

use crate::HazardClass;

/// Per-class detection confidence threshold applied by the upstream detector
pub fn confidence_threshold(class: HazardClass) -> f64 {
    match class {
        HazardClass::Pothole => 0.35,
        HazardClass::Speedbump => 0.65,
        _ => 0.50,
    }
}

/// Apparent-size distance estimator
#[derive(Debug, Clone)]
pub struct DistanceEstimator {
    /// Approximate camera focal length in pixels
    focal_length_px: f64,
}

impl Default for DistanceEstimator {
    fn default() -> Self {
        Self {
            focal_length_px: 1000.0,
        }
    }
}

impl DistanceEstimator {
    /// Create an estimator with an explicit focal length
    pub fn new(focal_length_px: f64) -> Self {
        Self { focal_length_px }
    }

    /// Average real-world width assumed for a hazard class (meters)
    pub fn known_width_m(class: HazardClass) -> f64 {
        match class {
            HazardClass::Person => 0.5,
            HazardClass::Dog => 0.4,
            HazardClass::Cow => 0.8,
            // Classes without calibration fall back to the person width
            _ => 0.5,
        }
    }

    /// Estimate distance in meters from a bounding-box width in pixels
    pub fn estimate_m(&self, class: HazardClass, bbox_width_px: f64) -> f64 {
        Self::known_width_m(class) * self.focal_length_px / bbox_width_px
    }
}
