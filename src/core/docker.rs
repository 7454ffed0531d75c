/// Docker integration
///
/// Lists containers for the metrics record and runs lifecycle actions

use anyhow::{anyhow, Context, Result};
use bollard::container::{
    ListContainersOptions, RestartContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::models::ContainerSummary as BollardSummary;
use bollard::Docker;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::client::RemoteClient;
use crate::core::telemetry::{ContainerSummary, DockerMetrics};
use crate::utils::ContainerState;

/// Seconds Docker waits before killing a container on stop/restart
pub const STOP_TIMEOUT_SECS: i64 = 10;

/// Width of the short container id shown everywhere
const SHORT_ID_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("invalid action: {0}")]
    Unknown(String),
}

impl FromStr for ContainerAction {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "restart" => Ok(Self::Restart),
            _ => Err(ActionError::Unknown(s.to_string())),
        }
    }
}

impl ContainerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    /// Whether the action makes sense for a container in `state`
    pub fn applies_to(&self, state: ContainerState) -> bool {
        match self {
            Self::Start => !state.is_running(),
            Self::Stop => state.is_running() || state == ContainerState::Restarting,
            Self::Restart => true,
        }
    }
}

impl fmt::Display for ContainerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct DockerManager {
    docker: Docker,
}

impl DockerManager {
    /// Connect to the local daemon (socket or `DOCKER_HOST`)
    pub fn new_sync() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .context("Failed to connect to Docker daemon. Is Docker running?")?;
        Ok(Self { docker })
    }

    /// Connect and confirm the daemon answers; `None` when it doesn't
    pub async fn connect() -> Option<Self> {
        let manager = match Self::new_sync() {
            Ok(manager) => manager,
            Err(e) => {
                debug!("Docker unavailable: {:#}", e);
                return None;
            }
        };

        if manager.check_docker().await {
            Some(manager)
        } else {
            debug!("Docker daemon did not answer ping");
            None
        }
    }

    /// Check if Docker daemon is accessible
    pub async fn check_docker(&self) -> bool {
        self.docker.ping().await.is_ok()
    }

    /// All containers, running or not
    pub async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let options = Some(ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        });

        let containers = self
            .docker
            .list_containers(options)
            .await
            .context("Failed to list containers")?;

        Ok(containers.into_iter().map(summary_from_bollard).collect())
    }

    /// Container counts plus the list, for the metrics record
    pub async fn docker_metrics(&self) -> Result<DockerMetrics> {
        let containers = self.list_containers().await?;
        Ok(docker_metrics_from(containers))
    }

    pub async fn perform(&self, action: ContainerAction, id: &str) -> Result<()> {
        info!("Container {}: {}", action, id);
        match action {
            ContainerAction::Start => self
                .docker
                .start_container(id, None::<StartContainerOptions<String>>)
                .await
                .with_context(|| format!("Failed to start container {}", id)),
            ContainerAction::Stop => self
                .docker
                .stop_container(id, Some(StopContainerOptions { t: STOP_TIMEOUT_SECS }))
                .await
                .with_context(|| format!("Failed to stop container {}", id)),
            ContainerAction::Restart => self
                .docker
                .restart_container(
                    id,
                    Some(RestartContainerOptions {
                        t: STOP_TIMEOUT_SECS as isize,
                    }),
                )
                .await
                .with_context(|| format!("Failed to restart container {}", id)),
        }
    }
}

/// Where lifecycle actions are sent
#[derive(Clone)]
pub enum ContainerControl {
    /// This host's daemon; `None` when Docker is unavailable
    Local(Option<DockerManager>),
    Remote(RemoteClient),
}

impl ContainerControl {
    pub async fn perform(&self, action: ContainerAction, id: &str) -> Result<()> {
        match self {
            Self::Local(Some(docker)) => docker.perform(action, id).await,
            Self::Local(None) => Err(anyhow!("Docker is not available")),
            Self::Remote(client) => Ok(client.container_action(action, id).await?),
        }
    }
}

pub fn docker_metrics_from(containers: Vec<ContainerSummary>) -> DockerMetrics {
    let running_count = containers
        .iter()
        .filter(|c| ContainerState::from(c.state.as_str()).is_running())
        .count() as u32;

    DockerMetrics {
        container_count: containers.len() as u32,
        running_count,
        containers,
    }
}

/// Convert bollard's summary into the metrics record entry
fn summary_from_bollard(summary: BollardSummary) -> ContainerSummary {
    let name = summary
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let id = summary
        .id
        .map(|id| id.chars().take(SHORT_ID_LEN).collect())
        .unwrap_or_default();

    ContainerSummary {
        id,
        name,
        state: summary.state.unwrap_or_else(|| "unknown".to_string()),
        status: summary.status.unwrap_or_default(),
        image: summary.image.unwrap_or_else(|| "unknown".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_case_insensitive() {
        assert_eq!("start".parse(), Ok(ContainerAction::Start));
        assert_eq!("STOP".parse(), Ok(ContainerAction::Stop));
        assert_eq!(" Restart ".parse(), Ok(ContainerAction::Restart));
        assert_eq!(
            "pause".parse::<ContainerAction>(),
            Err(ActionError::Unknown("pause".to_string()))
        );
    }

    #[test]
    fn test_action_applies_to_state() {
        assert!(ContainerAction::Start.applies_to(ContainerState::Stopped));
        assert!(!ContainerAction::Start.applies_to(ContainerState::Running));
        assert!(ContainerAction::Stop.applies_to(ContainerState::Running));
        assert!(!ContainerAction::Stop.applies_to(ContainerState::Stopped));
        assert!(ContainerAction::Restart.applies_to(ContainerState::Dead));
    }

    #[test]
    fn test_summary_conversion() {
        let summary = BollardSummary {
            id: Some("0123456789abcdef0123".to_string()),
            names: Some(vec!["/grafana".to_string()]),
            image: Some("grafana/grafana:10".to_string()),
            state: Some("running".to_string()),
            status: Some("Up 3 hours".to_string()),
            ..Default::default()
        };

        let converted = summary_from_bollard(summary);
        assert_eq!(converted.id, "0123456789ab");
        assert_eq!(converted.name, "grafana");
        assert_eq!(converted.state, "running");
        assert_eq!(converted.status, "Up 3 hours");
    }

    #[test]
    fn test_summary_conversion_defaults() {
        let converted = summary_from_bollard(BollardSummary::default());
        assert_eq!(converted.id, "");
        assert_eq!(converted.name, "unknown");
        assert_eq!(converted.image, "unknown");
    }

    #[tokio::test]
    async fn test_local_control_without_docker() {
        let control = ContainerControl::Local(None);
        let err = control.perform(ContainerAction::Start, "abc").await.unwrap_err();
        assert!(err.to_string().contains("Docker is not available"));
    }

    #[test]
    fn test_docker_metrics_counts() {
        let container = |state: &str| ContainerSummary {
            state: state.to_string(),
            ..Default::default()
        };
        let metrics =
            docker_metrics_from(vec![container("running"), container("exited"), container("running")]);

        assert_eq!(metrics.container_count, 3);
        assert_eq!(metrics.running_count, 2);
    }
}
