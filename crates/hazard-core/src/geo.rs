//! Geographic position math

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Positional epsilon for report deduplication (degrees, roughly 11 m)
pub const DEDUPE_EPSILON_DEG: f64 = 0.0001;

/// A geographic fix from the location provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    /// Create a new position
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to another position in kilometers (haversine)
    pub fn distance_km(&self, other: &Position) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// True when both coordinates differ by less than the dedupe epsilon
    pub fn within_epsilon(&self, other: &Position) -> bool {
        (self.lat - other.lat).abs() < DEDUPE_EPSILON_DEG
            && (self.lng - other.lng).abs() < DEDUPE_EPSILON_DEG
    }
}
