use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};

pub mod types;

pub use types::{CoordinatorState, PollResult};

use crate::device::{DeviceSnapshot, FetchError, SenseClient};
use crate::integration::SetupError;

/// Polls the device on a fixed period and publishes the latest result.
///
/// Single writer, many readers: the state lives in a `watch` channel and is
/// replaced after every poll. Readers never wait on the network.
pub struct Coordinator {
    name: String,
    client: SenseClient,
    interval: Duration,
    state: watch::Sender<CoordinatorState>,
}

impl Coordinator {
    pub fn new(name: impl Into<String>, client: SenseClient, interval: Duration) -> Self {
        let (state, _) = watch::channel(CoordinatorState::default());
        Self {
            name: name.into(),
            client,
            interval,
            state,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One poll; the outcome is published before returning.
    pub async fn refresh(&self) -> Result<Arc<DeviceSnapshot>, FetchError> {
        let result = self.client.fetch().await;
        let at = Utc::now();

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let previous_failures = self.state.borrow().consecutive_failures;
                self.state
                    .send_modify(|state| state.record_success(Arc::clone(&snapshot), at));

                if previous_failures > 0 {
                    tracing::info!(coordinator = %self.name, "fetching data recovered");
                }
                tracing::debug!(coordinator = %self.name, records = snapshot.len(), "poll finished");
                Ok(snapshot)
            }
            Err(err) => {
                let mut failures = 0;
                self.state.send_modify(|state| {
                    state.record_failure(err.clone(), at);
                    failures = state.consecutive_failures;
                });

                // Only the first failure in a row is worth a warning
                if failures == 1 {
                    tracing::warn!(coordinator = %self.name, url = %self.client.url(), error = %err, "error fetching data");
                } else {
                    tracing::debug!(coordinator = %self.name, failures, error = %err, "still failing");
                }
                Err(err)
            }
        }
    }

    /// Setup gate: the very first poll must succeed.
    pub async fn first_refresh(&self) -> Result<Arc<DeviceSnapshot>, SetupError> {
        self.refresh().await.map_err(SetupError::InitialRefresh)
    }

    pub fn latest(&self) -> Option<PollResult> {
        self.state.borrow().last_result.clone()
    }

    pub fn last_snapshot(&self) -> Option<Arc<DeviceSnapshot>> {
        self.state.borrow().last_snapshot.clone()
    }

    pub fn state(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    /// Notified after every poll, successful or not.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    /// Starts the periodic poll. The first tick fires one interval from now:
    /// the initial poll is `first_refresh`.
    pub fn spawn(self: Arc<Self>) -> PollerHandle {
        let coordinator = self;
        let task = tokio::spawn(async move {
            let period = coordinator.interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            // A slow poll pushes the schedule back instead of bursting
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::debug!(coordinator = %coordinator.name, ?period, "polling started");
            loop {
                ticker.tick().await;
                // Errors are already recorded and logged
                let _ = coordinator.refresh().await;
            }
        });

        PollerHandle { task }
    }
}

/// Owns the periodic poll task. Stopping, or dropping the handle, cancels it;
/// an in-flight request is abandoned.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
