//! HTTP client for the hazard reports service

use std::time::Duration;

use hazard_core::{HazardReport, PendingReport};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Upper bound on any single request; a dead endpoint must fail, not hang
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Report service errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

/// Acknowledgment returned by the report service.
///
/// `success: false` is a deliberate server decision (for example a recent
/// report already covers the location), not a delivery failure.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAck {
    pub success: bool,

    /// Opaque server-assigned report id; only a short prefix is surfaced
    #[serde(default)]
    pub report_id: Option<String>,

    /// Server-provided reason when the report was declined
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmitAck {
    /// Short id prefix surfaced to the driver
    pub fn short_id(&self) -> Option<&str> {
        self.report_id.as_deref().map(|id| {
            let end = id
                .char_indices()
                .nth(8)
                .map(|(i, _)| i)
                .unwrap_or(id.len());
            &id[..end]
        })
    }
}

/// Remote reports endpoint seam
pub trait ReportsApi {
    /// Submit one pending report
    fn submit(
        &self,
        report: &PendingReport,
    ) -> impl std::future::Future<Output = Result<SubmitAck, ReportError>> + Send;

    /// Fetch all known hazard reports (no pagination contract)
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<HazardReport>, ReportError>> + Send;
}

/// HTTP implementation of [`ReportsApi`]
pub struct HttpReportsApi {
    base_url: String,
    client: Client,
}

impl HttpReportsApi {
    /// Create a client against the service base URL
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

impl ReportsApi for HttpReportsApi {
    /// `POST /api/hazard-notification` with the pending report as JSON
    async fn submit(&self, report: &PendingReport) -> Result<SubmitAck, ReportError> {
        let url = format!("{}/api/hazard-notification", self.base_url);
        debug!("Submitting report {} to {}", report.report_key, url);

        let ack: SubmitAck = self
            .client
            .post(&url)
            .json(report)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if ack.success && ack.report_id.is_none() {
            return Err(ReportError::InvalidResponse(
                "acknowledgment without report_id".to_string(),
            ));
        }

        info!(
            "Report {} acknowledged (success: {})",
            report.report_key, ack.success
        );
        Ok(ack)
    }

    /// `GET /api/hazard-reports` returning the full report list
    async fn list(&self) -> Result<Vec<HazardReport>, ReportError> {
        let url = format!("{}/api/hazard-reports", self.base_url);
        debug!("Fetching hazard reports from {}", url);

        let reports: Vec<HazardReport> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Fetched {} hazard reports", reports.len());
        Ok(reports)
    }
}
