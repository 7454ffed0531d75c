/// Host metrics collection
///
/// Keeps sysinfo handles alive between calls so per-core CPU usage is
/// measured over the interval since the previous collection.

use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use sysinfo::{Components, Disks, Networks, System};
use tracing::{debug, warn};

use crate::core::docker::DockerManager;
use crate::core::telemetry::{
    normalize_architecture, CpuMetrics, DiskMetrics, DockerMetrics, HostInfo, KubernetesInfo,
    MemoryMetrics, NetworkMetrics, PowerInfo, SystemMetrics,
};

pub struct MetricsCollector {
    sys: System,
    networks: Networks,
    disks: Disks,
    components: Components,
    docker: Option<DockerManager>,
}

impl MetricsCollector {
    pub fn new(docker: Option<DockerManager>) -> Self {
        let mut sys = System::new_all();
        // Prime the CPU counters; the first real reading is a delta from here
        sys.refresh_cpu_usage();

        Self {
            sys,
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
            docker,
        }
    }

    /// Collector with Docker attached when the daemon answers
    pub async fn with_local_docker() -> Self {
        Self::new(DockerManager::connect().await)
    }

    pub fn docker(&self) -> Option<&DockerManager> {
        self.docker.as_ref()
    }

    pub async fn collect(&mut self) -> Result<SystemMetrics> {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.networks.refresh();
        self.disks.refresh();
        self.components.refresh();

        let docker = match &self.docker {
            Some(manager) => match manager.docker_metrics().await {
                Ok(metrics) => metrics,
                Err(e) => {
                    warn!("Container listing failed: {:#}", e);
                    DockerMetrics::default()
                }
            },
            None => DockerMetrics::default(),
        };

        let metrics = SystemMetrics {
            timestamp: Utc::now(),
            cpu: self.cpu_metrics(),
            memory: self.memory_metrics(),
            disk: self.disk_metrics(),
            network: self.network_metrics(),
            docker,
            host: host_info(),
        };

        debug!(
            "Collected metrics: {} cores, {} disks, {} containers",
            metrics.cpu.core_count,
            metrics.disk.len(),
            metrics.docker.container_count
        );

        Ok(metrics)
    }

    fn cpu_metrics(&self) -> CpuMetrics {
        let usage_percent: Vec<f64> = self
            .sys
            .cpus()
            .iter()
            .map(|cpu| cpu.cpu_usage() as f64)
            .collect();

        // Hottest CPU-ish sensor; 0 when the platform exposes none
        let temperature = self
            .components
            .iter()
            .filter(|c| {
                let label = c.label().to_lowercase();
                label.contains("cpu") || label.contains("core") || label.contains("package")
            })
            .map(|c| c.temperature() as f64)
            .filter(|t| t.is_finite())
            .fold(0.0, f64::max);

        CpuMetrics {
            core_count: usage_percent.len(),
            usage_percent,
            temperature,
        }
    }

    fn memory_metrics(&self) -> MemoryMetrics {
        let total = self.sys.total_memory();
        let used = self.sys.used_memory();
        MemoryMetrics {
            total,
            used,
            free: self.sys.free_memory(),
            used_percent: percent_of(used, total),
        }
    }

    fn disk_metrics(&self) -> Vec<DiskMetrics> {
        self.disks
            .iter()
            .map(|disk| {
                let total = disk.total_space();
                let free = disk.available_space();
                let used = total.saturating_sub(free);
                DiskMetrics {
                    path: disk.mount_point().to_string_lossy().to_string(),
                    total,
                    used,
                    free,
                    used_percent: percent_of(used, total),
                }
            })
            .collect()
    }

    fn network_metrics(&self) -> NetworkMetrics {
        self.networks
            .iter()
            .fold(NetworkMetrics::default(), |mut acc, (_, data)| {
                acc.bytes_sent += data.total_transmitted();
                acc.bytes_recv += data.total_received();
                acc.packets_sent += data.total_packets_transmitted();
                acc.packets_recv += data.total_packets_received();
                acc
            })
    }
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn host_info() -> HostInfo {
    let architecture = normalize_architecture(std::env::consts::ARCH).to_string();
    let kubernetes = kubernetes_info(
        std::env::var("NODE_NAME").ok(),
        std::env::var("NODE_ROLE").ok(),
        &architecture,
    );

    HostInfo {
        hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
        os: std::env::consts::OS.to_string(),
        platform: System::name().unwrap_or_default().to_lowercase(),
        uptime: System::uptime(),
        is_multi_arch: kubernetes
            .as_ref()
            .map(|k| k.is_arm || k.is_amd64)
            .unwrap_or(false),
        kubernetes,
        power: PowerInfo::estimate(&architecture),
        architecture,
    }
}

/// Node details when running inside a Kubernetes pod (downward API env)
pub fn kubernetes_info(
    node_name: Option<String>,
    node_role: Option<String>,
    architecture: &str,
) -> Option<KubernetesInfo> {
    let node_name = node_name.filter(|n| !n.trim().is_empty())?;

    let mut node_labels = HashMap::new();
    node_labels.insert("arch".to_string(), architecture.to_string());

    Some(KubernetesInfo {
        node_name,
        node_labels,
        is_arm: architecture == "arm64" || architecture == "arm",
        is_amd64: architecture == "amd64",
        node_role: node_role
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "worker".to_string()),
    })
}
