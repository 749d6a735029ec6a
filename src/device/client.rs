use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::time::{Duration, timeout};

use super::{DeviceSnapshot, FetchError};

/// Sensor endpoint on the device's local API
pub const SENSOR_PATH: &str = "/v1/constellation/sensor";

/// Upper bound for one request, body included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn sensor_url(host: &str) -> String {
    format!("http://{host}{SENSOR_PATH}")
}

/// HTTP client for a single Renson Sense
#[derive(Debug, Clone)]
pub struct SenseClient {
    http: Client,
    url: String,
    timeout: Duration,
}

impl SenseClient {
    pub fn new(host: &str) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("could not build HTTP client")?;

        Ok(Self {
            http,
            url: sensor_url(host),
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Replaces the request bound. Used by tests that need a fast timeout.
    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One fetch-and-parse cycle.
    pub async fn fetch(&self) -> Result<DeviceSnapshot, FetchError> {
        let work = async {
            let resp = self.http.get(&self.url).send().await?;
            if resp.status() != StatusCode::OK {
                return Err(FetchError::Status(resp.status().as_u16()));
            }
            let body = resp.bytes().await?;
            Ok::<_, FetchError>(body)
        };

        let body = match timeout(self.timeout, work).await {
            Ok(result) => result?,
            Err(_) => return Err(FetchError::Timeout(self.timeout)),
        };

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(records)) => Ok(records),
            Ok(_) => Err(FetchError::NotAnObject),
            Err(e) => Err(FetchError::Decode(e.to_string())),
        }
    }

    /// Connectivity check: a GET that answers 200 in time. The body is not
    /// inspected.
    pub async fn probe(&self) -> bool {
        match timeout(self.timeout, self.http.get(&self.url).send()).await {
            Ok(Ok(resp)) => resp.status() == StatusCode::OK,
            Ok(Err(e)) => {
                tracing::debug!(url = %self.url, error = %e, "probe request failed");
                false
            }
            Err(_) => {
                tracing::debug!(url = %self.url, "probe timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::testing::FakeDevice;

    #[test]
    fn builds_sensor_url() {
        assert_eq!(
            sensor_url("192.168.1.40"),
            "http://192.168.1.40/v1/constellation/sensor"
        );
        assert_eq!(
            sensor_url("sense.local:8080"),
            "http://sense.local:8080/v1/constellation/sensor"
        );
    }

    #[tokio::test]
    async fn fetch_keeps_device_record_order() {
        let device = FakeDevice::start().await;
        device.set_body(
            r#"{"7": {"type": "rh"}, "2": {"type": "temp"}, "5": {"type": "avoc"}}"#,
        );

        let client = SenseClient::new(&device.host()).unwrap();
        let snapshot = client.fetch().await.unwrap();

        let ids: Vec<&str> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(ids, ["7", "2", "5"]);
    }

    #[tokio::test]
    async fn non_200_is_a_status_error() {
        let device = FakeDevice::start().await;
        device.set_status(503);

        let client = SenseClient::new(&device.host()).unwrap();
        assert_eq!(client.fetch().await, Err(FetchError::Status(503)));
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let device = FakeDevice::start().await;
        device.set_body("<html>not json</html>");

        let client = SenseClient::new(&device.host()).unwrap();
        assert!(matches!(client.fetch().await, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn json_array_is_rejected() {
        let device = FakeDevice::start().await;
        device.set_body(r#"[{"type": "temp"}]"#);

        let client = SenseClient::new(&device.host()).unwrap();
        assert_eq!(client.fetch().await, Err(FetchError::NotAnObject));
    }

    #[tokio::test]
    async fn slow_device_times_out() {
        let device = FakeDevice::start().await;
        device.set_delay(Duration::from_millis(500));

        let client = SenseClient::new(&device.host())
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        assert!(matches!(client.fetch().await, Err(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let host = FakeDevice::unused_host().await;
        let client = SenseClient::new(&host).unwrap();
        assert!(matches!(client.fetch().await, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn probe_reflects_status() {
        let device = FakeDevice::start().await;
        let client = SenseClient::new(&device.host()).unwrap();
        assert!(client.probe().await);

        device.set_status(404);
        assert!(!client.probe().await);
    }
}
