use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use super::AppState;

pub async fn health(State(integration): State<AppState>) -> (StatusCode, Json<Value>) {
    let coordinator = integration.coordinator();
    let state = coordinator.state();
    let (status, label) = if state.last_update_success() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "device unavailable")
    };

    (status,
        Json(json!({
        "status": label,
        "UTC_time": chrono::Utc::now().to_rfc2822(),
        "polling": integration.is_running(),
        "scan_interval_secs": coordinator.interval().as_secs(),
        "last_poll_at": coordinator.latest().map(|r| r.at().to_rfc3339()),
        "last_update_success": state.last_update_success(),
        "consecutive_failures": state.consecutive_failures,
        "entities": integration.entities().len(),
    })))
}
