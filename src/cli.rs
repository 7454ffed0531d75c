/// CLI argument parsing

use clap::{Parser, Subcommand};
use std::time::Duration;

use crate::utils::ConfigOverrides;

// Build timestamp injected at compile time
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
pub const VERSION_WITH_BUILD: &str = concat!(env!("CARGO_PKG_VERSION"), " (built: ", env!("BUILD_TIMESTAMP"), ")");

#[derive(Parser)]
#[command(name = "pulse-dash")]
#[command(author, version = VERSION_WITH_BUILD, about, long_about = None)]
pub struct Cli {
    /// Inactivity before the screensaver starts (e.g. "60s", "5m")
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub idle_timeout: Option<Duration>,

    /// Metrics refresh interval (e.g. "2s")
    #[arg(long, global = true, value_parser = parse_refresh)]
    pub refresh: Option<Duration>,

    /// Screensaver frame rate
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub fps: Option<u32>,

    /// Read metrics from a remote pulse-dash server instead of this host
    #[arg(long, global = true)]
    pub remote: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print one metrics record as JSON
    Snapshot {
        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Start, stop or restart a container
    Container {
        /// start, stop or restart
        action: String,

        /// Container id or name
        id: String,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },

    /// Run the metrics HTTP/WebSocket server
    #[cfg(feature = "server")]
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Refresh interval flag; zero is rejected
fn parse_refresh(raw: &str) -> Result<Duration, String> {
    let interval = humantime::parse_duration(raw).map_err(|e| e.to_string())?;
    if interval.is_zero() {
        return Err("refresh interval must be greater than zero".to_string());
    }
    Ok(interval)
}

impl Cli {
    /// Flags that override the config file
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            idle_timeout: self.idle_timeout,
            refresh_interval: self.refresh,
            frame_rate: self.fps,
            remote_url: self.remote.clone(),
            ..Default::default()
        };

        #[cfg(feature = "server")]
        if let Some(Commands::Serve { host, port }) = &self.command {
            overrides.host = host.clone();
            overrides.port = *port;
        }

        overrides
    }
}
