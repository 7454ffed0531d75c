/// Application-wide constants

use std::time::Duration;

pub const APP_NAME: &str = "pulse-dash";

/// Config lives in `<config_dir>/pulse-dash/`
pub const CONFIG_DIR_NAME: &str = "pulse-dash";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "pulse-dash.log";

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);
/// Shortest refresh interval accepted from config or flags
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_FRAME_RATE: u32 = 30;

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// WebSocket push period
pub const WS_PUSH_INTERVAL: Duration = Duration::from_secs(2);

/// Gauge thresholds (percent)
pub const USAGE_WARNING_PERCENT: f64 = 60.0;
pub const USAGE_CRITICAL_PERCENT: f64 = 80.0;

/// Missed refreshes before the feed is shown as stale
pub const STALE_AFTER_REFRESHES: u32 = 3;

/// How long a status message stays in the footer
pub const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(5);
