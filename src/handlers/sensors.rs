use axum::{Json, extract::{Path, State}, http::StatusCode};

use super::AppState;
use crate::formatter::JsonFormatter;
use crate::formatter::json::SensorsJson;
use crate::sensor::{EntityState, descriptors};

pub async fn list_sensors(State(integration): State<AppState>) -> Json<SensorsJson> {
    Json(JsonFormatter::format(&integration))
}

pub async fn get_sensor(
    State(integration): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntityState>, (StatusCode, String)> {
    let descriptor = descriptors::find(&key)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown sensor '{key}'")))?;

    integration.entity_state(descriptor.key).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("device does not report '{}'", descriptor.sensor_type),
        )
    })
}
