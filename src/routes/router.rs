use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::{AppState, get_sensor, health, list_sensors};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sensors", get(list_sensors))
        .route("/sensors/{key}", get(get_sensor))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::device::testing::FakeDevice;
    use crate::integration::Integration;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    async fn serve(device: &FakeDevice) -> (String, AppState) {
        let mut config = AppConfig::default();
        config.device.host = device.host();
        let state = Arc::new(Integration::setup(&config).await.unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let app = create_router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (base, state)
    }

    #[tokio::test]
    async fn lists_sensors() {
        let device = FakeDevice::start().await;
        let (base, _state) = serve(&device).await;

        let resp = reqwest::get(format!("{base}/sensors")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["entities"].as_array().map(Vec::len), Some(7));
        assert_eq!(body["device"]["model"], "Sense");
    }

    #[tokio::test]
    async fn single_sensor_and_unknown_key() {
        let device = FakeDevice::start().await;
        let (base, _state) = serve(&device).await;

        let body: Value = reqwest::get(format!("{base}/sensors/voc"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["value"], json!(412));
        assert_eq!(body["unit"], "ppm");

        let resp = reqwest::get(format!("{base}/sensors/co2")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_follows_last_poll() {
        let device = FakeDevice::start().await;
        let (base, state) = serve(&device).await;

        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        device.set_status(500);
        let _ = state.coordinator().refresh().await;
        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["consecutive_failures"], 1);
    }
}
