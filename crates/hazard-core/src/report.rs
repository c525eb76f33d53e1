//! Report records exchanged with the hazard-reports service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Position;

/// A pothole sighting waiting to be reported.
///
/// Owned by the report queue until it is flushed or dropped as a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingReport {
    /// Where the hazard was sighted
    pub location: Position,

    /// When the hazard was sighted
    pub timestamp: DateTime<Utc>,

    /// Hazard type label (currently always "pothole")
    #[serde(rename = "type")]
    pub hazard_type: String,

    /// Idempotency key for at-least-once submission
    pub report_key: Uuid,
}

impl PendingReport {
    /// Create a new pending report with a fresh idempotency key
    pub fn new(location: Position, hazard_type: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            location,
            timestamp,
            hazard_type: hazard_type.to_string(),
            report_key: Uuid::new_v4(),
        }
    }
}

/// A known hazard report fetched from the reports endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardReport {
    /// Reported location
    pub location: Position,

    /// Hazard type label
    #[serde(rename = "type", default)]
    pub hazard_type: String,

    /// Severity assigned by the reporting service, when present
    #[serde(default)]
    pub severity: Option<String>,

    /// When the hazard was reported, when present
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
