/// HTTP metrics server
///
/// Serves the metrics record, a WebSocket push stream and container actions
/// so a remote dashboard (`--remote`) can watch this host.

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use routes::create_router;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::{DockerManager, MetricsCollector};
use crate::utils::{ServerConfig, APP_NAME, WS_PUSH_INTERVAL};

/// Shared by every request; the collector keeps CPU counters between calls
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<Mutex<MetricsCollector>>,
    pub docker: Option<DockerManager>,
}

impl AppState {
    pub fn new(collector: MetricsCollector) -> Self {
        let docker = collector.docker().cloned();
        Self {
            collector: Arc::new(Mutex::new(collector)),
            docker,
        }
    }
}

pub async fn run(config: &ServerConfig) -> Result<()> {
    let collector = MetricsCollector::with_local_docker().await;
    if collector.docker().is_none() {
        warn!("Docker not available, container endpoints will return 503");
    }

    let app = create_router(AppState::new(collector), config.cors);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("{} metrics server listening on http://{}", APP_NAME, addr);
    info!("  GET  /metrics           - Current metrics record");
    info!("  GET  /ws                - Metrics pushed every {:?}", WS_PUSH_INTERVAL);
    info!("  POST /container/action  - Start, stop or restart a container");
    info!("  GET  /health            - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}
