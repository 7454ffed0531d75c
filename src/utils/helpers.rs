/// Helper utilities for formatting and display

use ratatui::style::Color;

use crate::utils::constants::{USAGE_CRITICAL_PERCENT, USAGE_WARNING_PERCENT};

/// Format bytes to human-readable size
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Host uptime as `Xd Xh Xm`
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{}d {}h {}m", days, hours, minutes)
}

/// Short countdown-style duration
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Truncate string with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Threshold color for a usage percentage (>80 red, >60 yellow)
pub fn usage_color(percent: f64) -> Color {
    if percent > USAGE_CRITICAL_PERCENT {
        Color::Red
    } else if percent > USAGE_WARNING_PERCENT {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Parse Docker container state to simplified state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Stopped,
    Paused,
    Restarting,
    Dead,
    Unknown,
}

impl From<&str> for ContainerState {
    fn from(status: &str) -> Self {
        let status_lower = status.to_lowercase();
        if status_lower.starts_with("up") || status_lower.contains("running") {
            ContainerState::Running
        } else if status_lower.contains("paused") {
            ContainerState::Paused
        } else if status_lower.contains("restarting") {
            ContainerState::Restarting
        } else if status_lower.contains("dead") || status_lower.contains("removing") {
            ContainerState::Dead
        } else if status_lower.contains("exited")
            || status_lower.contains("stopped")
            || status_lower.contains("created")
        {
            ContainerState::Stopped
        } else {
            ContainerState::Unknown
        }
    }
}

impl ContainerState {
    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContainerState::Running => "Running",
            ContainerState::Stopped => "Stopped",
            ContainerState::Paused => "Paused",
            ContainerState::Restarting => "Restarting",
            ContainerState::Dead => "Dead",
            ContainerState::Unknown => "Unknown",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            ContainerState::Running => Color::Green,
            ContainerState::Stopped => Color::Gray,
            ContainerState::Paused => Color::Yellow,
            ContainerState::Restarting => Color::Cyan,
            ContainerState::Dead => Color::Red,
            ContainerState::Unknown => Color::White,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0d 0h 0m");
        assert_eq!(format_uptime(90_061), "1d 1h 1m");
        assert_eq!(format_uptime(3_599), "0d 0h 59m");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3661), "1h 1m");
        assert_eq!(format_duration(86400), "1d 0h");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("grafana", 10), "grafana");
        assert_eq!(truncate_string("prometheus-node-exporter", 10), "prometh...");
        assert_eq!(truncate_string("ünïcödé-name", 8), "ünïcö...");
    }

    #[test]
    fn test_usage_color_thresholds() {
        assert_eq!(usage_color(60.0), Color::Green);
        assert_eq!(usage_color(60.5), Color::Yellow);
        assert_eq!(usage_color(80.0), Color::Yellow);
        assert_eq!(usage_color(95.0), Color::Red);
    }

    #[test]
    fn test_container_state() {
        assert_eq!(ContainerState::from("running"), ContainerState::Running);
        assert_eq!(ContainerState::from("Up 2 hours"), ContainerState::Running);
        assert_eq!(ContainerState::from("exited"), ContainerState::Stopped);
        assert_eq!(ContainerState::from("created"), ContainerState::Stopped);
        assert_eq!(ContainerState::from("paused"), ContainerState::Paused);
        assert!(ContainerState::Running.is_running());
        assert!(!ContainerState::Stopped.is_running());
    }
}
