use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pulse_dash::app::App;
use pulse_dash::cli::{Cli, Commands};
use pulse_dash::core::{ContainerAction, ContainerControl, DockerManager, MetricsCollector, RemoteClient};
use pulse_dash::utils::{logging, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    config.apply(cli.overrides());

    match cli.command {
        None => {
            // No command - run interactive TUI; the terminal is ours, so log to a file
            let log_path = logging::init_file()?;
            info!("Logging to {}", log_path.display());
            let mut app = App::new(config).await?;
            app.run().await?;
        }
        Some(Commands::Snapshot { pretty }) => {
            logging::init_stderr();
            handle_snapshot(&config, pretty).await?;
        }
        Some(Commands::Container { action, id }) => {
            logging::init_stderr();
            handle_container(&config, &action, &id).await?;
        }
        Some(Commands::Config { save }) => {
            logging::init_stderr();
            handle_config(&config, save)?;
        }
        #[cfg(feature = "server")]
        Some(Commands::Serve { .. }) => {
            logging::init_stderr();
            pulse_dash::server::run(&config.server).await?;
        }
    }

    Ok(())
}

async fn handle_snapshot(config: &AppConfig, pretty: bool) -> Result<()> {
    let metrics = match &config.remote_url {
        Some(url) => RemoteClient::new(url)?.fetch_metrics().await?,
        None => {
            let mut collector = MetricsCollector::with_local_docker().await;
            // CPU usage is a delta; give sysinfo one sampling interval
            tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
            collector.collect().await?
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&metrics)?
    } else {
        serde_json::to_string(&metrics)?
    };
    println!("{}", json);

    Ok(())
}

async fn handle_container(config: &AppConfig, action: &str, id: &str) -> Result<()> {
    let action: ContainerAction = action.parse()?;

    let control = match &config.remote_url {
        Some(url) => ContainerControl::Remote(RemoteClient::new(url)?),
        None => ContainerControl::Local(Some(DockerManager::new_sync()?)),
    };

    control
        .perform(action, id)
        .await
        .with_context(|| format!("Container {} failed", action))?;
    println!("✓ {} {}", action, id);

    Ok(())
}

fn handle_config(config: &AppConfig, save: bool) -> Result<()> {
    let path = AppConfig::config_path()?;

    if save {
        config.save()?;
        println!("Configuration saved to {}", path.display());
        return Ok(());
    }

    println!("Config file: {}", path.display());
    println!();
    print!("{}", toml::to_string_pretty(config)?);

    Ok(())
}
