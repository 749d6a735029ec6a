use serde::{Deserialize, Serialize};

use crate::integration::SetupError;

pub const DEFAULT_NAME: &str = "Renson Sense";

/// The device this instance talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Host or `host:port` of the sensor, no scheme
    #[serde(default)]
    pub host: String,
    /// Display name, prefixed to every entity name
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            name: default_name(),
        }
    }
}

impl DeviceSettings {
    /// Trims the user input and fills in the default name.
    pub fn validated(&self) -> Result<Self, SetupError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(SetupError::InvalidConfig("host is required".to_string()));
        }
        if host.contains("://") || host.contains('/') {
            return Err(SetupError::InvalidConfig(format!(
                "host '{host}' must not contain a scheme or path"
            )));
        }

        let name = match self.name.trim() {
            "" => DEFAULT_NAME,
            name => name,
        };

        Ok(Self {
            host: host.to_string(),
            name: name.to_string(),
        })
    }
}
