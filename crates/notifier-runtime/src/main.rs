//! Road Hazard Notifier - Main Entry Point

use alerting::{TracingAlarmSound, TracingAlertSink};
use anyhow::Context;
use hazard_core::Position;
use notifier_runtime::{init_logging, NotifierRuntime, RuntimeConfig, TransportEvent};
use report_sync::HttpReportsApi;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Road Hazard Notifier v{} ===", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("loading runtime config")?;
    let base_url =
        std::env::var("HAZARD_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    info!("Reporting to {}", base_url);

    let (event_tx, event_rx) = mpsc::channel(64);
    let (position_tx, position_rx) = watch::channel(None);

    // A fixed position can be supplied when no location provider is
    // attached, e.g. HAZARD_FIX=31.2518,34.7913
    if let Ok(fix) = std::env::var("HAZARD_FIX") {
        match parse_fix(&fix) {
            Some(position) => {
                let _ = position_tx.send(Some(position));
            }
            None => warn!("Ignoring unparseable HAZARD_FIX: {}", fix),
        }
    }

    // Telemetry arrives as JSON lines on stdin when run standalone; the
    // production transport feeds the same channel.
    tokio::spawn(async move {
        let mut lines = BufReader::new(stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if event_tx.send(TransportEvent::Telemetry(line)).await.is_err() {
                break;
            }
        }
    });

    let runtime = NotifierRuntime::new(
        config,
        TracingAlertSink::default(),
        TracingAlarmSound::new("emergency-brake"),
        TracingAlarmSound::new("lane-alarm"),
        HttpReportsApi::new(&base_url),
    );
    runtime.run(event_rx, position_rx).await;

    Ok(())
}

fn load_config() -> anyhow::Result<RuntimeConfig> {
    match std::env::var("HAZARD_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path))?;
            Ok(serde_json::from_str(&raw)?)
        }
        Err(_) => Ok(RuntimeConfig::default()),
    }
}

fn parse_fix(raw: &str) -> Option<Position> {
    let (lat, lng) = raw.split_once(',')?;
    Some(Position::new(
        lat.trim().parse().ok()?,
        lng.trim().parse().ok()?,
    ))
}
