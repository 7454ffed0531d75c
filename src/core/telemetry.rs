/// Telemetry records
///
/// `SystemMetrics` is the full record served by `/metrics` and `/ws` and
/// consumed by the dashboard. `TelemetrySnapshot` is the flattened view the
/// screensaver reads every frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub timestamp: DateTime<Utc>,
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    #[serde(default)]
    pub disk: Vec<DiskMetrics>,
    pub network: NetworkMetrics,
    pub docker: DockerMetrics,
    pub host: HostInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuMetrics {
    /// Per-core usage
    #[serde(default)]
    pub usage_percent: Vec<f64>,
    pub core_count: usize,
    #[serde(default)]
    pub temperature: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskMetrics {
    pub path: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

/// Cumulative interface counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
}

impl NetworkMetrics {
    pub fn total_bytes(&self) -> u64 {
        self.bytes_sent.saturating_add(self.bytes_recv)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerMetrics {
    pub container_count: u32,
    pub running_count: u32,
    #[serde(default)]
    pub containers: Vec<ContainerSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub state: String,
    pub status: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub os: String,
    pub platform: String,
    pub uptime: u64,
    pub architecture: String,
    pub is_multi_arch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesInfo>,
    pub power: PowerInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KubernetesInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_name: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub node_labels: HashMap<String, String>,
    pub is_arm: bool,
    pub is_amd64: bool,
    pub node_role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerInfo {
    pub estimated_watts: f64,
    pub power_efficiency: String,
    pub architecture_type: String,
}

impl PowerInfo {
    /// Typical draw for the machine class behind an architecture
    pub fn estimate(architecture: &str) -> Self {
        let (watts, efficiency, kind) = match architecture {
            "amd64" => (45.0, "medium", "Intel/AMD x86_64"),
            "arm64" => (7.0, "high", "ARM Cortex-A"),
            "arm" => (2.5, "ultra-high", "ARM Cortex-A (32-bit)"),
            _ => (25.0, "unknown", "Unknown"),
        };
        Self {
            estimated_watts: watts,
            power_efficiency: efficiency.to_string(),
            architecture_type: kind.to_string(),
        }
    }
}

/// Map Rust target arch names onto the names used in the metrics record
pub fn normalize_architecture(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        other => other,
    }
}

impl SystemMetrics {
    /// Mean of the per-core usage values, 0 when none were reported
    pub fn average_cpu(&self) -> f64 {
        let cores = &self.cpu.usage_percent;
        if cores.is_empty() {
            return 0.0;
        }
        cores.iter().sum::<f64>() / cores.len() as f64
    }
}

/// Clamp a percentage into `[0, 100]`; NaN becomes 0
pub fn sanitize_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// The flattened record the screensaver works from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub avg_cpu_percent: f64,
    pub memory_used_percent: f64,
    /// MB/s sent + received since the previous record
    pub network_throughput_mbs: f64,
    pub hostname: String,
    pub uptime_seconds: u64,
    pub containers_running: u32,
    pub containers_total: u32,
}

impl TelemetrySnapshot {
    pub fn from_metrics(metrics: &SystemMetrics, network_throughput_mbs: f64) -> Self {
        let containers_total = metrics.docker.container_count;
        Self {
            avg_cpu_percent: metrics.average_cpu(),
            memory_used_percent: metrics.memory.used_percent,
            network_throughput_mbs,
            hostname: metrics.host.hostname.clone(),
            uptime_seconds: metrics.host.uptime,
            containers_running: metrics.docker.running_count.min(containers_total),
            containers_total,
        }
    }

    /// `(cpu + mem) / 2` over sanitized inputs
    pub fn average_load(&self) -> f64 {
        (sanitize_percent(self.avg_cpu_percent) + sanitize_percent(self.memory_used_percent)) / 2.0
    }

    /// Throughput with NaN, infinite and negative values floored to 0
    pub fn sanitized_throughput(&self) -> f64 {
        if self.network_throughput_mbs.is_finite() && self.network_throughput_mbs > 0.0 {
            self.network_throughput_mbs
        } else {
            0.0
        }
    }
}

/// Derives network throughput from consecutive cumulative counters
#[derive(Debug, Default)]
pub struct ThroughputTracker {
    previous: Option<(u64, DateTime<Utc>)>,
}

impl ThroughputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// MB/s since the previous record. The first record, counter resets and
    /// non-advancing timestamps all yield 0.
    pub fn observe(&mut self, metrics: &SystemMetrics) -> f64 {
        let total = metrics.network.total_bytes();
        let now = metrics.timestamp;

        let throughput = match self.previous {
            Some((previous_total, previous_at)) => {
                let elapsed = (now - previous_at).num_milliseconds() as f64 / 1000.0;
                if elapsed > 0.0 {
                    total.saturating_sub(previous_total) as f64 / 1_000_000.0 / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        self.previous = Some((total, now));
        throughput
    }

    /// Convenience: observe and flatten in one step
    pub fn snapshot(&mut self, metrics: &SystemMetrics) -> TelemetrySnapshot {
        let throughput = self.observe(metrics);
        TelemetrySnapshot::from_metrics(metrics, throughput)
    }
}
