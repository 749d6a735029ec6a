use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

use super::{SENSORS, SensorDescriptor, available_types, extract};
use crate::coordinator::CoordinatorState;
use crate::device::DeviceSnapshot;

/// What an entity shows at a given moment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub entity_id: String,
    pub display_name: String,
    pub unit: Option<&'static str>,
    pub value: Option<Value>,
    pub available: bool,
}

/// One metric of one device, bound to a catalog descriptor
#[derive(Debug, Clone)]
pub struct SensorEntity {
    descriptor: &'static SensorDescriptor,
    entity_id: String,
    display_name: String,
}

impl SensorEntity {
    pub fn new(entry_id: &str, device_name: &str, descriptor: &'static SensorDescriptor) -> Self {
        Self {
            descriptor,
            entity_id: format!("{entry_id}_{}", descriptor.key),
            display_name: format!("{device_name} {}", descriptor.name),
        }
    }

    pub fn key(&self) -> &'static str {
        self.descriptor.key
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Re-derived from the snapshot on every call.
    pub fn native_value(&self, snapshot: Option<&DeviceSnapshot>) -> Option<Value> {
        snapshot.and_then(|s| extract(s, self.descriptor)).cloned()
    }

    pub fn state(&self, coordinator: &CoordinatorState) -> EntityState {
        EntityState {
            entity_id: self.entity_id.clone(),
            display_name: self.display_name.clone(),
            unit: self.descriptor.unit,
            value: self.native_value(coordinator.last_snapshot.as_deref()),
            available: coordinator.last_update_success(),
        }
    }
}

/// Entities for every catalog descriptor whose type the device reported in
/// `snapshot`. Computed once; types showing up later are ignored.
pub fn setup_entities(entry_id: &str, device_name: &str, snapshot: &DeviceSnapshot) -> Vec<SensorEntity> {
    let types = available_types(snapshot);

    SENSORS
        .iter()
        .filter(|d| types.contains(d.sensor_type))
        .map(|d| SensorEntity::new(entry_id, device_name, d))
        .collect()
}

/// Follows coordinator updates and recomputes every entity value, logging the
/// ones that changed. Ends when the coordinator is dropped.
pub async fn track_updates(entities: Arc<[SensorEntity]>, mut updates: watch::Receiver<CoordinatorState>) {
    let mut shown: Vec<Option<Value>> = {
        let state = updates.borrow_and_update();
        entities
            .iter()
            .map(|e| e.native_value(state.last_snapshot.as_deref()))
            .collect()
    };

    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();
        if !state.last_update_success() {
            tracing::debug!("entities unavailable until the next successful poll");
            continue;
        }

        for (entity, previous) in entities.iter().zip(shown.iter_mut()) {
            let value = entity.native_value(state.last_snapshot.as_deref());
            if value != *previous {
                tracing::debug!(
                    entity_id = %entity.entity_id,
                    old = ?previous,
                    new = ?value,
                    "state changed"
                );
                *previous = value;
            }
        }
    }
}
