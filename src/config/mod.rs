use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

pub mod device;
pub mod settings;

pub use device::DeviceSettings;
pub use settings::Settings;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sensor to poll
    #[serde(default)]
    pub device: DeviceSettings,
    /// Base settings
    #[serde(default)]
    pub settings: Settings,
}

impl AppConfig {
    /// Loads the configuration from a YAML file (if any) and applies the
    /// `RENSON_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;

        Self::from_yaml(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yml::from_str(content).context("could not parse YAML")?;

        if config.settings.connection.scan_interval == 0 {
            anyhow::bail!("settings.connection.scan_interval must be greater than zero");
        }

        Ok(config)
    }

    /// Overrides file values with whatever `lookup` yields for
    /// `RENSON_HOST`, `RENSON_NAME`, `RENSON_SCAN_INTERVAL` and `RENSON_LISTEN`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("RENSON_HOST") {
            self.device.host = host;
        }
        if let Some(name) = lookup("RENSON_NAME") {
            self.device.name = name;
        }
        if let Some(interval) = lookup("RENSON_SCAN_INTERVAL")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            self.settings.connection.scan_interval = interval;
        }
        if let Some(listen) = lookup("RENSON_LISTEN") {
            self.settings.server.listen = listen;
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.settings.connection.scan_interval)
    }

    pub fn listen(&self) -> &str {
        &self.settings.server.listen
    }
}
