//! pulse-dash: host and container telemetry dashboard with a load-driven
//! particle screensaver.

pub mod app;
pub mod cli;
pub mod core;
pub mod screens;
pub mod screensaver;
#[cfg(feature = "server")]
pub mod server;
pub mod utils;
pub mod widgets;
