pub mod client;
pub mod collector;
pub mod docker;
pub mod feed;
pub mod telemetry;

pub use client::{ClientError, RemoteClient};
pub use collector::MetricsCollector;
pub use docker::{ActionError, ContainerAction, ContainerControl, DockerManager};
pub use feed::{spawn_feed, ConnectionStatus, FeedEvent, FeedHealth, MetricsSource, TelemetryUpdate};
pub use telemetry::{SystemMetrics, TelemetrySnapshot, ThroughputTracker};
