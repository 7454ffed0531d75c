/// Application configuration management
/// Stores user preferences in <config_dir>/pulse-dash/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::constants::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Inactivity before the screensaver starts
    #[serde(with = "humantime_str")]
    pub idle_timeout: Duration,
    /// Telemetry collection period
    #[serde(with = "humantime_str")]
    pub refresh_interval: Duration,
    pub frame_rate: u32,
    /// Watch a remote pulse-dash server instead of this host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            frame_rate: DEFAULT_FRAME_RATE,
            remote_url: None,
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            cors: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub idle_timeout: Option<Duration>,
    pub refresh_interval: Option<Duration>,
    pub frame_rate: Option<u32>,
    pub remote_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl AppConfig {
    /// Directory holding the config and log files
    pub fn config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base.join(CONFIG_DIR_NAME))
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from file; defaults when it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.clamp_refresh();

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(timeout) = overrides.idle_timeout {
            self.idle_timeout = timeout;
        }
        if let Some(refresh) = overrides.refresh_interval {
            self.refresh_interval = refresh;
        }
        if let Some(fps) = overrides.frame_rate {
            self.frame_rate = fps;
        }
        if overrides.remote_url.is_some() {
            self.remote_url = overrides.remote_url;
        }
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        self.clamp_refresh();
    }

    /// A zero period would stall the telemetry feed
    fn clamp_refresh(&mut self) {
        self.refresh_interval = self.refresh_interval.max(MIN_REFRESH_INTERVAL);
    }
}

/// Durations as humantime strings ("60s", "1m 30s")
mod humantime_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "idle_timeout = \"5m\"\nframe_rate = 20\n\n[server]\nport = 9090\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.idle_timeout, Duration::from_secs(300));
        assert_eq!(config.frame_rate, 20);
        assert_eq!(config.refresh_interval, Duration::from_secs(2));
        assert_eq!(config.server.port, 9090);
        assert!(config.server.cors);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.remote_url = Some("http://nuc.local:8080".to_string());
        config.idle_timeout = Duration::from_secs(90);
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_duration_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "idle_timeout = \"soon\"\n").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply(ConfigOverrides {
            idle_timeout: Some(Duration::from_secs(10)),
            frame_rate: Some(60),
            ..Default::default()
        });

        assert_eq!(config.idle_timeout, Duration::from_secs(10));
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.refresh_interval, DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.remote_url, None);
    }

    #[test]
    fn test_zero_refresh_is_floored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "refresh_interval = \"0s\"\n").unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap().refresh_interval, MIN_REFRESH_INTERVAL);

        let mut config = AppConfig::default();
        config.apply(ConfigOverrides {
            refresh_interval: Some(Duration::ZERO),
            ..Default::default()
        });
        assert_eq!(config.refresh_interval, MIN_REFRESH_INTERVAL);
    }
}
