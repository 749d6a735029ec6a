use serde::{Deserialize, Serialize};

/// Default poll period (seconds)
pub const DEFAULT_SCAN_INTERVAL: u64 = 30;

/// Default address for the HTTP surface
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

/// Base application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Device polling settings
    pub connection: ConnectionSettings,
    /// HTTP surface settings
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Period between two polls (seconds)
    pub scan_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address, `host:port`
    pub listen: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            scan_interval: DEFAULT_SCAN_INTERVAL,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}
