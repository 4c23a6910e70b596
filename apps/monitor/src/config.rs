//! Monitor configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/devlink/monitor.toml`
//! - Windows: `%APPDATA%/devlink/monitor.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use devlink_protocol::Device;
use devlink_protocol::constants::{IDLE_BUDGET, RETRY_THRESHOLD, TICK_PERIOD};
use devlink_session::SessionConfig;

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Device host, optionally with a port (`192.168.4.1`, `esp.local:8080`).
    #[serde(default = "default_host")]
    pub host: String,

    /// Device table to poll.
    #[serde(default = "default_device")]
    pub device: Device,

    /// Poll tick in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Attempts without a reply before the link is reopened.
    #[serde(default = "default_retry_threshold")]
    pub retry_threshold: u32,

    /// Ticks before the channel sweep restarts on its own.
    #[serde(default = "default_idle_budget")]
    pub idle_budget: u32,

    /// Ticks to hold off after each poll (0 = poll every tick).
    #[serde(default)]
    pub quiet_window: u32,
}

fn default_host() -> String {
    // Soft-AP address of the device firmware.
    "192.168.4.1".into()
}

fn default_device() -> Device {
    Device::Pwm
}

fn default_tick_ms() -> u64 {
    TICK_PERIOD.as_millis() as u64
}

fn default_retry_threshold() -> u32 {
    RETRY_THRESHOLD
}

fn default_idle_budget() -> u32 {
    IDLE_BUDGET
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            device: default_device(),
            tick_ms: default_tick_ms(),
            retry_threshold: default_retry_threshold(),
            idle_budget: default_idle_budget(),
            quiet_window: 0,
        }
    }
}

impl Config {
    /// Loads configuration from `path` (or the platform default), creating
    /// a default file if none exists.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(&path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Session tunables derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            retry_threshold: self.retry_threshold,
            idle_budget: self.idle_budget,
            quiet_window: self.quiet_window,
            tick_period: Duration::from_millis(self.tick_ms.max(1)),
            ..SessionConfig::default()
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("devlink")
            .join("monitor.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("devlink").join("monitor.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/devlink/monitor.toml"))
    }
}
