use serde_json::{Map, Value};

pub mod client;
pub mod error;

pub use client::SenseClient;
pub use error::FetchError;

/// One full payload from the device: record id -> record, in the order the
/// device sent them. Each record carries a `"type"` tag.
pub type DeviceSnapshot = Map<String, Value>;

#[cfg(test)]
pub(crate) mod testing {
    use axum::{Router, extract::State, http::StatusCode, routing::get};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::net::TcpListener;

    use super::client::SENSOR_PATH;

    /// Payload captured from a Sense with the core sensor set.
    pub const SAMPLE_BODY: &str = r#"{
        "0": {"type": "temp", "parameter": {"temperature": {"value": 21.5, "unit": "C"}}},
        "1": {"type": "rh", "parameter": {"humidity": {"value": 48}}},
        "2": {"type": "ah", "parameter": {"humidity": {"value": 7.4}}},
        "3": {"type": "avoc", "parameter": {"raw": {"value": 412}}},
        "4": {"type": "press", "parameter": {"pressure": {"value": 101325}}},
        "5": {"type": "heap_info", "parameter": {"average_current_heap": {"value": 61234}}},
        "6": {"type": "rssi", "parameter": {"rssi": {"value": -58}}}
    }"#;

    struct Reply {
        status: u16,
        body: String,
        delay: Duration,
    }

    #[derive(Clone)]
    struct Shared {
        reply: Arc<Mutex<Reply>>,
        hits: Arc<AtomicUsize>,
    }

    /// Local HTTP server standing in for the sensor.
    pub struct FakeDevice {
        addr: std::net::SocketAddr,
        shared: Shared,
    }

    impl FakeDevice {
        pub async fn start() -> Self {
            let shared = Shared {
                reply: Arc::new(Mutex::new(Reply {
                    status: 200,
                    body: SAMPLE_BODY.to_string(),
                    delay: Duration::ZERO,
                })),
                hits: Arc::new(AtomicUsize::new(0)),
            };

            let app = Router::new()
                .route(SENSOR_PATH, get(serve_sensor))
                .with_state(shared.clone());

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self { addr, shared }
        }

        /// A `host:port` nothing is listening on.
        pub async fn unused_host() -> String {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            addr.to_string()
        }

        pub fn host(&self) -> String {
            self.addr.to_string()
        }

        pub fn set_status(&self, status: u16) {
            self.shared.reply.lock().unwrap().status = status;
        }

        pub fn set_body(&self, body: &str) {
            self.shared.reply.lock().unwrap().body = body.to_string();
        }

        pub fn set_delay(&self, delay: Duration) {
            self.shared.reply.lock().unwrap().delay = delay;
        }

        pub fn hits(&self) -> usize {
            self.shared.hits.load(Ordering::SeqCst)
        }
    }

    async fn serve_sensor(State(shared): State<Shared>) -> (StatusCode, String) {
        shared.hits.fetch_add(1, Ordering::SeqCst);

        let (status, body, delay) = {
            let reply = shared.reply.lock().unwrap();
            (reply.status, reply.body.clone(), reply.delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
    }
}
