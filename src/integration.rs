use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::{AppConfig, DeviceSettings};
use crate::coordinator::{Coordinator, CoordinatorState, PollerHandle};
use crate::device::{FetchError, SenseClient};
use crate::sensor::{EntityState, SensorEntity, setup_entities, track_updates};

/// Why an instance could not be set up
#[derive(Debug)]
pub enum SetupError {
    InvalidConfig(String),
    /// The connectivity probe failed
    CannotConnect { host: String },
    /// The first poll failed
    InitialRefresh(FetchError),
    Client(anyhow::Error),
}

impl SetupError {
    /// Short code shown to the operator
    pub fn code(&self) -> &'static str {
        match self {
            SetupError::InvalidConfig(_) => "invalid_config",
            SetupError::CannotConnect { .. } => "cannot_connect",
            SetupError::InitialRefresh(_) => "initial_refresh_failed",
            SetupError::Client(_) => "unknown",
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
            SetupError::CannotConnect { host } => write!(f, "cannot connect to {host}"),
            SetupError::InitialRefresh(err) => write!(f, "first poll failed: {err}"),
            SetupError::Client(err) => write!(f, "{err:#}"),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::InitialRefresh(err) => Some(err),
            _ => None,
        }
    }
}

/// Stable id for an instance, derived from the host.
pub fn entry_id(host: &str) -> String {
    host.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Validates the user input and checks that the device answers.
pub async fn validate_input(device: &DeviceSettings) -> Result<DeviceSettings, SetupError> {
    let device = device.validated()?;
    let client = SenseClient::new(&device.host).map_err(SetupError::Client)?;

    if !client.probe().await {
        return Err(SetupError::CannotConnect { host: device.host });
    }
    Ok(device)
}

/// One configured device: its coordinator, background tasks and entities.
///
/// Owned by whoever composes the service and handed to the HTTP layer.
pub struct Integration {
    entry_id: String,
    device: DeviceSettings,
    coordinator: Arc<Coordinator>,
    entities: Arc<[SensorEntity]>,
    poller: Option<PollerHandle>,
    tracker: Option<JoinHandle<()>>,
}

impl Integration {
    /// Runs the first poll and builds the entities from it. Fails fast when
    /// that poll fails. Polling does not start until [`Integration::start`].
    pub async fn setup(config: &AppConfig) -> Result<Self, SetupError> {
        let device = config.device.validated()?;
        let client = SenseClient::new(&device.host).map_err(SetupError::Client)?;
        Self::setup_with_client(device, client, config.scan_interval()).await
    }

    pub async fn setup_with_client(
        device: DeviceSettings,
        client: SenseClient,
        interval: std::time::Duration,
    ) -> Result<Self, SetupError> {
        let entry_id = entry_id(&device.host);
        let coordinator = Arc::new(Coordinator::new(
            format!("{} {}", device.name, device.host),
            client,
            interval,
        ));

        let snapshot = coordinator.first_refresh().await?;
        let entities: Arc<[SensorEntity]> = setup_entities(&entry_id, &device.name, &snapshot).into();

        tracing::info!(
            host = %device.host,
            entities = entities.len(),
            records = snapshot.len(),
            "device set up"
        );

        Ok(Self {
            entry_id,
            device,
            coordinator,
            entities,
            poller: None,
            tracker: None,
        })
    }

    /// Starts periodic polling and entity tracking.
    pub fn start(&mut self) {
        if self.poller.is_some() {
            return;
        }
        self.tracker = Some(tokio::spawn(track_updates(
            Arc::clone(&self.entities),
            self.coordinator.subscribe(),
        )));
        self.poller = Some(Arc::clone(&self.coordinator).spawn());
    }

    /// Stops polling. Readers keep seeing the last published state.
    pub fn unload(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
            tracing::info!(host = %self.device.host, "polling stopped");
        }
        if let Some(tracker) = self.tracker.take() {
            tracker.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.poller.as_ref().is_some_and(PollerHandle::is_running)
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn device(&self) -> &DeviceSettings {
        &self.device
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn entities(&self) -> &[SensorEntity] {
        &self.entities
    }

    /// Current state of every entity, read from the last published poll.
    pub fn states(&self) -> (CoordinatorState, Vec<EntityState>) {
        let state = self.coordinator.state();
        let entities = self.entities.iter().map(|e| e.state(&state)).collect();
        (state, entities)
    }

    pub fn entity_state(&self, key: &str) -> Option<EntityState> {
        let state = self.coordinator.state();
        self.entities
            .iter()
            .find(|e| e.key() == key)
            .map(|e| e.state(&state))
    }
}

impl Drop for Integration {
    fn drop(&mut self) {
        self.unload();
    }
}
