use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::device::{DeviceSnapshot, FetchError};

/// Outcome of the most recent poll
#[derive(Debug, Clone)]
pub enum PollResult {
    Snapshot {
        snapshot: Arc<DeviceSnapshot>,
        at: DateTime<Utc>,
    },
    Failure {
        reason: FetchError,
        at: DateTime<Utc>,
    },
}

impl PollResult {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            PollResult::Snapshot { at, .. } | PollResult::Failure { at, .. } => *at,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PollResult::Snapshot { .. })
    }
}

/// Everything the coordinator publishes. Replaced as a whole after each poll.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    /// `None` until the first poll completes
    pub last_result: Option<PollResult>,
    /// Last good payload, kept across failed polls
    pub last_snapshot: Option<Arc<DeviceSnapshot>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub polls: u64,
}

impl CoordinatorState {
    pub fn last_update_success(&self) -> bool {
        self.last_result.as_ref().is_some_and(PollResult::is_success)
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        match &self.last_result {
            Some(PollResult::Failure { reason, .. }) => Some(reason),
            _ => None,
        }
    }

    pub(crate) fn record_success(&mut self, snapshot: Arc<DeviceSnapshot>, at: DateTime<Utc>) {
        self.last_result = Some(PollResult::Snapshot {
            snapshot: Arc::clone(&snapshot),
            at,
        });
        self.last_snapshot = Some(snapshot);
        self.last_success_at = Some(at);
        self.consecutive_failures = 0;
        self.polls += 1;
    }

    pub(crate) fn record_failure(&mut self, reason: FetchError, at: DateTime<Utc>) {
        self.last_result = Some(PollResult::Failure { reason, at });
        self.consecutive_failures += 1;
        self.polls += 1;
    }
}
