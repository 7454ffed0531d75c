/// Tracing subscriber setup
///
/// The TUI owns the terminal, so interactive sessions log to a file in the
/// config directory. Everything else logs to stderr.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::utils::constants::LOG_FILE_NAME;
use crate::utils::AppConfig;

const DEFAULT_FILTER: &str = "pulse_dash=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to stderr
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to `<config_dir>/pulse-dash/pulse-dash.log`; returns the file path
pub fn init_file() -> Result<PathBuf> {
    let dir = AppConfig::config_dir()?;
    fs::create_dir_all(&dir).context("Failed to create config directory")?;
    let path = dir.join(LOG_FILE_NAME);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    Ok(path)
}
