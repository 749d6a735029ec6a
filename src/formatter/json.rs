use serde::Serialize;

use crate::coordinator::CoordinatorState;
use crate::integration::Integration;
use crate::sensor::EntityState;

pub const MANUFACTURER: &str = "Renson";
pub const MODEL: &str = "Sense";

/// JSON document served on `/sensors` and printed by `fetch`
#[derive(Debug, Clone, Serialize)]
pub struct SensorsJson {
    pub device: DeviceJson,
    pub timestamp: String,
    pub last_update_success: bool,
    pub last_success_at: Option<String>,
    pub summary: Summary,
    pub entities: Vec<EntityState>,
    /// Reason of the last poll failure, while it lasts
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceJson {
    pub entry_id: String,
    pub name: String,
    pub host: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_entities: usize,
    pub with_value: usize,
    pub consecutive_failures: u32,
    pub polls: u64,
}

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(integration: &Integration) -> SensorsJson {
        let (state, entities) = integration.states();
        Self::format_states(integration, &state, entities)
    }

    fn format_states(
        integration: &Integration,
        state: &CoordinatorState,
        entities: Vec<EntityState>,
    ) -> SensorsJson {
        let device = integration.device();

        let summary = Summary {
            total_entities: entities.len(),
            with_value: entities.iter().filter(|e| e.value.is_some()).count(),
            consecutive_failures: state.consecutive_failures,
            polls: state.polls,
        };

        SensorsJson {
            device: DeviceJson {
                entry_id: integration.entry_id().to_string(),
                name: device.name.clone(),
                host: device.host.clone(),
                manufacturer: MANUFACTURER,
                model: MODEL,
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
            last_update_success: state.last_update_success(),
            last_success_at: state.last_success_at.map(|t| t.to_rfc3339()),
            summary,
            entities,
            error: state.last_error().map(ToString::to_string),
        }
    }

    pub fn to_json_string(integration: &Integration) -> anyhow::Result<String> {
        serde_json::to_string_pretty(&Self::format(integration))
            .map_err(|e| anyhow::anyhow!("could not serialize sensors to JSON: {}", e))
    }
}
