//! Pothole report queue
//!
//! Collects pothole sightings, deduplicates them by position, and releases
//! FIFO batches for submission under a cooldown. Failed submissions return
//! to the front of the queue, giving at-least-once delivery.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use hazard_core::{PendingReport, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Report queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Cooldown between flushes (seconds, default 30 minutes)
    pub cooldown_secs: u64,

    /// Interval between flush checks (seconds)
    pub flush_interval_secs: u64,

    /// Maximum reports released per flush
    pub batch_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 1800,
            flush_interval_secs: 10,
            batch_size: 3,
        }
    }
}

/// Pending pothole report queue
pub struct ReportQueue {
    config: QueueConfig,
    pending: VecDeque<PendingReport>,
    last_sent: Option<Instant>,
}

impl ReportQueue {
    /// Create an empty queue
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            pending: VecDeque::new(),
            last_sent: None,
        }
    }

    /// Record a detection.
    ///
    /// Only pothole-type detections with a known position are queued;
    /// a sighting within the positional epsilon of any pending entry is
    /// dropped as a duplicate.
    pub fn observe(
        &mut self,
        hazard_type: &str,
        position: Option<Position>,
        timestamp: DateTime<Utc>,
    ) {
        if !hazard_type.eq_ignore_ascii_case("pothole") {
            return;
        }
        let Some(position) = position else {
            return;
        };

        if self
            .pending
            .iter()
            .any(|report| report.location.within_epsilon(&position))
        {
            debug!(
                "Duplicate pothole sighting at {:.5},{:.5} dropped",
                position.lat, position.lng
            );
            return;
        }

        self.pending
            .push_back(PendingReport::new(position, hazard_type, timestamp));
        debug!("Pothole sighting queued ({} pending)", self.pending.len());
    }

    /// Take the next FIFO batch if the cooldown gate is open.
    ///
    /// The cooldown gates starting a flush, not individual sends: once the
    /// gate opens, up to `batch_size` reports go out back-to-back.
    pub fn take_batch(&mut self, now: Instant) -> Vec<PendingReport> {
        if self.pending.is_empty() {
            return Vec::new();
        }

        let cooldown = Duration::from_secs(self.config.cooldown_secs);
        if let Some(last) = self.last_sent {
            if now.duration_since(last) < cooldown {
                return Vec::new();
            }
        }

        self.last_sent = Some(now);
        let count = self.config.batch_size.min(self.pending.len());
        self.pending.drain(..count).collect()
    }

    /// Record a successful send time
    pub fn mark_sent(&mut self, now: Instant) {
        self.last_sent = Some(now);
    }

    /// Return a failed submission to the front of the queue.
    ///
    /// Does not touch the cooldown clock, so the retry goes out with the
    /// next eligible flush.
    pub fn requeue_front(&mut self, report: PendingReport) {
        self.pending.push_front(report);
    }

    /// Number of reports waiting to be sent
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for ReportQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(n: u64) -> Duration {
        Duration::from_secs(n * 60)
    }

    #[test]
    fn test_dedupe_within_epsilon() {
        let mut queue = ReportQueue::default();
        let base = Position::new(31.2500000, 34.7900000);
        let near = Position::new(31.2500500, 34.7900500);

        queue.observe("pothole", Some(base), Utc::now());
        queue.observe("pothole", Some(near), Utc::now());
        assert_eq!(queue.pending_len(), 1);

        let far = Position::new(31.2510000, 34.7900000);
        queue.observe("pothole", Some(far), Utc::now());
        assert_eq!(queue.pending_len(), 2);
    }

    #[test]
    fn test_only_potholes_with_position_enqueue() {
        let mut queue = ReportQueue::default();
        let position = Position::new(31.25, 34.79);

        queue.observe("speedbump", Some(position), Utc::now());
        queue.observe("pothole", None, Utc::now());
        assert_eq!(queue.pending_len(), 0);

        queue.observe("Pothole", Some(position), Utc::now());
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn test_first_flush_releases_fifo_batch() {
        let mut queue = ReportQueue::default();
        for i in 0..4 {
            let position = Position::new(31.25 + 0.001 * i as f64, 34.79);
            queue.observe("pothole", Some(position), Utc::now());
        }

        let now = Instant::now();
        let batch = queue.take_batch(now);
        assert_eq!(batch.len(), 3);
        assert!((batch[0].location.lat - 31.25).abs() < 1e-9);
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn test_cooldown_gates_next_flush() {
        let mut queue = ReportQueue::default();
        for i in 0..4 {
            let position = Position::new(31.25 + 0.001 * i as f64, 34.79);
            queue.observe("pothole", Some(position), Utc::now());
        }

        let t0 = Instant::now();
        assert_eq!(queue.take_batch(t0).len(), 3);

        // Flush checks inside the cooldown release nothing
        assert!(queue.take_batch(t0 + Duration::from_secs(10)).is_empty());
        assert!(queue.take_batch(t0 + minutes(29)).is_empty());

        // The gate opens after the cooldown
        assert_eq!(queue.take_batch(t0 + minutes(30)).len(), 1);
    }

    #[test]
    fn test_empty_queue_never_flushes() {
        let mut queue = ReportQueue::default();
        assert!(queue.take_batch(Instant::now()).is_empty());
    }

    #[test]
    fn test_failed_report_retries_without_duplicates() {
        let mut queue = ReportQueue::default();
        let position = Position::new(31.25, 34.79);
        queue.observe("pothole", Some(position), Utc::now());

        let t0 = Instant::now();
        let mut batch = queue.take_batch(t0);
        assert_eq!(batch.len(), 1);
        let report = batch.remove(0);
        let key = report.report_key;

        // Submission failed: the entry goes back to the front
        queue.requeue_front(report);
        assert_eq!(queue.pending_len(), 1);

        // Re-observing the same spot does not duplicate the pending entry
        queue.observe("pothole", Some(position), Utc::now());
        assert_eq!(queue.pending_len(), 1);

        // Still inside the cooldown: nothing released
        assert!(queue.take_batch(t0 + minutes(5)).is_empty());

        // Next eligible flush retries the same report exactly once
        let retry = queue.take_batch(t0 + minutes(30));
        assert_eq!(retry.len(), 1);
        assert_eq!(retry[0].report_key, key);
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_requeued_report_goes_out_first() {
        let mut queue = ReportQueue::default();
        queue.observe("pothole", Some(Position::new(31.25, 34.79)), Utc::now());

        let t0 = Instant::now();
        let failed = queue.take_batch(t0).remove(0);
        let failed_key = failed.report_key;

        queue.observe("pothole", Some(Position::new(31.26, 34.79)), Utc::now());
        queue.requeue_front(failed);

        let batch = queue.take_batch(t0 + minutes(30));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].report_key, failed_key);
    }

    #[test]
    fn test_mark_sent_restarts_cooldown() {
        let mut queue = ReportQueue::default();
        queue.observe("pothole", Some(Position::new(31.25, 34.79)), Utc::now());

        let t0 = Instant::now();
        let _ = queue.take_batch(t0);
        queue.observe("pothole", Some(Position::new(31.26, 34.79)), Utc::now());

        queue.mark_sent(t0 + minutes(1));
        assert!(queue.take_batch(t0 + minutes(30)).is_empty());
        assert_eq!(queue.take_batch(t0 + minutes(31)).len(), 1);
    }
}
