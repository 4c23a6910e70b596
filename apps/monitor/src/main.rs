//! devlink monitor entry point.

mod app;
mod config;
mod render;

use std::path::PathBuf;

use clap::Parser;
use devlink_protocol::Device;
use tracing_subscriber::EnvFilter;

/// Polls a devlink board over WebSocket and logs its channel values.
#[derive(Debug, Parser)]
#[command(name = "devlink-monitor", version, about)]
struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Device host, overriding the configuration.
    #[arg(long)]
    host: Option<String>,

    /// Device table to poll: pwm, pio, adc or dac.
    #[arg(long)]
    device: Option<Device>,

    /// Ticks to hold off after each poll.
    #[arg(long)]
    quiet_window: Option<u32>,

    /// Poll tick in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,
}

impl Cli {
    fn apply(self, config: &mut config::Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(device) = self.device {
            config.device = device;
        }
        if let Some(quiet) = self.quiet_window {
            config.quiet_window = quiet;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting devlink monitor"
    );

    let mut config = config::Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    tracing::info!(host = %config.host, device = %config.device, "configuration loaded");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(config))?;

    tracing::info!("monitor shut down cleanly");
    Ok(())
}
