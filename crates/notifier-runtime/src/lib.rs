//! Notifier Runtime
//!
//! Wires the transport and location streams into the four notifier state
//! machines and drives their timers on a single task. All transitions are
//! serialized by that task; the notifiers share no mutable state with each
//! other. Remote calls (report submission, report polling) run on spawned
//! tasks and report back over an internal channel, so an in-flight or hung
//! request never stalls telemetry processing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alerting::{
    AlarmSound, AlertRequest, AlertSeverity, AlertSink, BrakeAlert, BrakeConfig, LaneAlert,
    LaneConfig,
};
use chrono::Utc;
use hazard_core::{HazardReport, PendingReport, Position, TransportMessage};
use report_sync::{
    NearbyAdvisory, NearbyConfig, QueueConfig, ReportError, ReportQueue, ReportsApi, SubmitAck,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::interval;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// One inbound event from the live transport
#[derive(Debug)]
pub enum TransportEvent {
    /// JSON telemetry payload
    Telemetry(String),

    /// Opaque processed-image frame for the display, never interpreted here
    Frame(Vec<u8>),
}

/// Completion of a remote call running off the event loop
#[derive(Debug)]
enum ApiOutcome {
    Submitted {
        report: PendingReport,
        result: Result<SubmitAck, ReportError>,
    },
    Listed {
        result: Result<Vec<HazardReport>, ReportError>,
    },
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub brake: BrakeConfig,
    pub lane: LaneConfig,
    pub queue: QueueConfig,
    pub nearby: NearbyConfig,

    /// Confirmation alert duration after a delivered report (seconds)
    pub confirm_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            brake: BrakeConfig::default(),
            lane: LaneConfig::default(),
            queue: QueueConfig::default(),
            nearby: NearbyConfig::default(),
            confirm_secs: 5,
        }
    }
}

/// Initialize tracing output
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Event loop driving the four notifiers
pub struct NotifierRuntime<S, D, A> {
    config: RuntimeConfig,
    brake: BrakeAlert,
    lane: LaneAlert,
    queue: ReportQueue,
    nearby: NearbyAdvisory,
    sink: S,
    brake_sound: D,
    lane_sound: D,
    api: Arc<A>,
    latest_position: Option<Position>,
    poll_in_flight: bool,
    frame_tx: Option<mpsc::Sender<Vec<u8>>>,
}

impl<S, D, A> NotifierRuntime<S, D, A>
where
    S: AlertSink,
    D: AlarmSound,
    A: ReportsApi + Send + Sync + 'static,
{
    /// Create a runtime with fresh notifier state
    pub fn new(config: RuntimeConfig, sink: S, brake_sound: D, lane_sound: D, api: A) -> Self {
        Self {
            brake: BrakeAlert::new(config.brake.clone()),
            lane: LaneAlert::new(config.lane.clone()),
            queue: ReportQueue::new(config.queue.clone()),
            nearby: NearbyAdvisory::new(config.nearby.clone()),
            config,
            sink,
            brake_sound,
            lane_sound,
            api: Arc::new(api),
            latest_position: None,
            poll_in_flight: false,
            frame_tx: None,
        }
    }

    /// Forward binary transport frames to a display channel
    pub fn with_frame_output(mut self, frames: mpsc::Sender<Vec<u8>>) -> Self {
        self.frame_tx = Some(frames);
        self
    }

    /// Run until the transport channel closes.
    ///
    /// A reconnected transport gets a fresh runtime, so alert state always
    /// starts cleared.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<TransportEvent>,
        mut positions: watch::Receiver<Option<Position>>,
    ) {
        info!("Notifier runtime started");

        self.latest_position = *positions.borrow_and_update();
        let mut positions_open = true;

        // Remote-call completions come back over this channel so the loop
        // never awaits a request itself
        let (api_tx, mut api_rx) = mpsc::channel(16);

        let mut flush = interval(Duration::from_secs(self.config.queue.flush_interval_secs));
        let mut poll = interval(Duration::from_secs(self.config.nearby.poll_interval_secs));
        let mut tick = interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(TransportEvent::Telemetry(raw)) => self.on_telemetry(&raw),
                    Some(TransportEvent::Frame(bytes)) => self.forward_frame(bytes),
                    None => {
                        info!("Transport channel closed");
                        break;
                    }
                },
                outcome = api_rx.recv() => {
                    if let Some(outcome) = outcome {
                        self.on_api_outcome(outcome);
                    }
                },
                changed = positions.changed(), if positions_open => match changed {
                    Ok(()) => {
                        self.latest_position = *positions.borrow_and_update();
                        // Poll on position change or first availability,
                        // then restart the 30s cadence from here
                        self.poll_nearby(&api_tx);
                        poll.reset();
                    }
                    Err(_) => {
                        warn!("Location provider channel closed");
                        positions_open = false;
                    }
                },
                _ = flush.tick() => self.flush_reports(&api_tx),
                _ = poll.tick() => self.poll_nearby(&api_tx),
                _ = tick.tick() => self.on_tick(),
            }
        }

        self.shutdown();
    }

    /// Apply one JSON telemetry payload to the notifiers
    fn on_telemetry(&mut self, raw: &str) {
        let message = match TransportMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                // Prior alert state stays as it was
                warn!("Dropping malformed telemetry: {}", e);
                return;
            }
        };

        self.brake
            .on_frame(&message.hazard_distances, &mut self.sink, &mut self.brake_sound);
        self.lane.on_signal(
            message.driver_lane_hazard_count,
            now(),
            &mut self.sink,
            &mut self.lane_sound,
        );
        if !message.hazard_type.is_empty() {
            self.queue
                .observe(&message.hazard_type, self.latest_position, Utc::now());
        }
    }

    fn forward_frame(&mut self, bytes: Vec<u8>) {
        if let Some(frames) = &self.frame_tx {
            if frames.try_send(bytes).is_err() {
                debug!("Display frame dropped, channel full or closed");
            }
        }
    }

    /// Release a batch of pending reports when the cooldown gate is open.
    ///
    /// Each submission runs on its own task; the outcome comes back through
    /// the api channel.
    fn flush_reports(&mut self, api_tx: &mpsc::Sender<ApiOutcome>) {
        let batch = self.queue.take_batch(now());
        for report in batch {
            let api = Arc::clone(&self.api);
            let tx = api_tx.clone();
            tokio::spawn(async move {
                let result = api.submit(&report).await;
                let _ = tx.send(ApiOutcome::Submitted { report, result }).await;
            });
        }
    }

    /// Start a report poll unless one is already in flight
    fn poll_nearby(&mut self, api_tx: &mpsc::Sender<ApiOutcome>) {
        if self.latest_position.is_none() || self.poll_in_flight {
            return;
        }
        self.poll_in_flight = true;

        let api = Arc::clone(&self.api);
        let tx = api_tx.clone();
        tokio::spawn(async move {
            let result = api.list().await;
            let _ = tx.send(ApiOutcome::Listed { result }).await;
        });
    }

    /// Apply the completion of a remote call
    fn on_api_outcome(&mut self, outcome: ApiOutcome) {
        match outcome {
            ApiOutcome::Submitted { result: Ok(ack), .. } if ack.success => {
                self.queue.mark_sent(now());
                let id = ack.short_id().unwrap_or("unknown").to_string();
                self.sink.show(AlertRequest {
                    severity: AlertSeverity::Confirmation,
                    message: format!("Hazard reported to authorities (ID: {})", id),
                    auto_close: Some(Duration::from_secs(self.config.confirm_secs)),
                });
                info!("Hazard report delivered (id {})", id);
            }
            ApiOutcome::Submitted { result: Ok(ack), .. } => {
                // Server declined deliberately; the entry is consumed
                debug!(
                    "Hazard report declined: {}",
                    ack.message.as_deref().unwrap_or("no reason given")
                );
            }
            ApiOutcome::Submitted {
                report,
                result: Err(e),
            } => {
                warn!("Hazard report failed, requeued for retry: {}", e);
                self.queue.requeue_front(report);
            }
            ApiOutcome::Listed { result } => {
                self.poll_in_flight = false;
                match result {
                    Ok(reports) => {
                        if let Some(position) = self.latest_position {
                            self.nearby
                                .evaluate(&position, &reports, now(), &mut self.sink);
                        }
                    }
                    Err(e) => {
                        // The poll loop continues on schedule regardless
                        warn!("Nearby hazard poll failed: {}", e);
                    }
                }
            }
        }
    }

    fn on_tick(&mut self) {
        let t = now();
        self.lane.on_tick(t, &mut self.sink, &mut self.lane_sound);
        self.nearby.on_tick(t);
    }

    fn shutdown(&mut self) {
        info!("Notifier runtime stopping");
        self.brake.shutdown(&mut self.sink, &mut self.brake_sound);
        self.lane.shutdown(&mut self.sink, &mut self.lane_sound);
        self.nearby.shutdown(&mut self.sink);
    }
}
