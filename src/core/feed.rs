/// Background telemetry feed
///
/// Collects a metrics record every refresh interval and hands it to the UI
/// over an unbounded channel. The UI keeps only the newest update and tracks
/// the connection status from the outcomes.

use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::client::RemoteClient;
use crate::core::collector::MetricsCollector;
use crate::core::telemetry::{SystemMetrics, TelemetrySnapshot, ThroughputTracker};
use crate::utils::{MIN_REFRESH_INTERVAL, STALE_AFTER_REFRESHES};

#[derive(Debug, Clone)]
pub struct TelemetryUpdate {
    pub metrics: SystemMetrics,
    pub snapshot: TelemetrySnapshot,
}

/// Outcome of one collection attempt
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Update(TelemetryUpdate),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Nothing received yet
    Connecting,
    Connected,
    /// Last record is older than a few refresh intervals
    Stale,
    Error(String),
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Stale => "stale",
            Self::Error(_) => "error",
        }
    }
}

/// Tracks feed outcomes for the status badge
#[derive(Debug, Clone)]
pub struct FeedHealth {
    stale_after: Duration,
    last_success: Option<Instant>,
    last_error: Option<String>,
}

impl FeedHealth {
    pub fn new(refresh: Duration) -> Self {
        Self {
            stale_after: refresh.max(MIN_REFRESH_INTERVAL) * STALE_AFTER_REFRESHES,
            last_success: None,
            last_error: None,
        }
    }

    pub fn record(&mut self, event: &FeedEvent, now: Instant) {
        match event {
            FeedEvent::Update(_) => {
                self.last_success = Some(now);
                self.last_error = None;
            }
            FeedEvent::Failed(message) => self.last_error = Some(message.clone()),
        }
    }

    pub fn status(&self, now: Instant) -> ConnectionStatus {
        if let Some(error) = &self.last_error {
            return ConnectionStatus::Error(error.clone());
        }
        match self.last_success {
            None => ConnectionStatus::Connecting,
            Some(at) if now.saturating_duration_since(at) > self.stale_after => ConnectionStatus::Stale,
            Some(_) => ConnectionStatus::Connected,
        }
    }

    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }
}

/// Where metrics come from
pub enum MetricsSource {
    Local(MetricsCollector),
    Remote(RemoteClient),
}

impl MetricsSource {
    pub async fn fetch(&mut self) -> Result<SystemMetrics> {
        match self {
            Self::Local(collector) => collector.collect().await,
            Self::Remote(client) => Ok(client.fetch_metrics().await?),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Local(_) => "local".to_string(),
            Self::Remote(client) => client.base_url().to_string(),
        }
    }
}

/// Spawn the feed; it stops once the receiving side is dropped
pub fn spawn_feed(
    mut source: MetricsSource,
    refresh: Duration,
    tx: UnboundedSender<FeedEvent>,
) -> JoinHandle<()> {
    let refresh = refresh.max(MIN_REFRESH_INTERVAL);

    tokio::spawn(async move {
        let mut tracker = ThroughputTracker::new();
        let mut ticker = tokio::time::interval(refresh);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        debug!("Telemetry feed started ({}, every {:?})", source.describe(), refresh);

        loop {
            ticker.tick().await;

            if tx.is_closed() {
                break;
            }

            let event = match source.fetch().await {
                Ok(metrics) => {
                    let snapshot = tracker.snapshot(&metrics);
                    FeedEvent::Update(TelemetryUpdate { metrics, snapshot })
                }
                Err(e) => {
                    warn!("Metrics collection failed: {:#}", e);
                    FeedEvent::Failed(format!("{:#}", e))
                }
            };

            if tx.send(event).is_err() {
                break;
            }
        }

        debug!("Telemetry feed stopped");
    })
}
