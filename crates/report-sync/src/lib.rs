//! Report Synchronization
//!
//! Outbound pothole reporting and nearby-hazard advisories:
//! - Position-deduplicated pending-report queue with cooldown-gated FIFO
//!   batch flushes and retry-to-front on failure (at-least-once)
//! - Periodic polling of known hazard reports with a re-armed advisory

mod client;
mod nearby;
mod queue;

pub use client::{HttpReportsApi, ReportError, ReportsApi, SubmitAck};
pub use nearby::{NearbyAdvisory, NearbyConfig};
pub use queue::{QueueConfig, ReportQueue};
