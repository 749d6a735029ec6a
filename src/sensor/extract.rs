use serde_json::Value;
use std::collections::BTreeSet;

use super::SensorDescriptor;
use crate::device::DeviceSnapshot;

fn record_type(record: &Value) -> Option<&str> {
    record.get("type").and_then(Value::as_str)
}

/// First record, in device order, tagged with `sensor_type`.
pub fn find_record<'a>(snapshot: &'a DeviceSnapshot, sensor_type: &str) -> Option<&'a Value> {
    snapshot
        .values()
        .find(|record| record_type(record) == Some(sensor_type))
}

/// Walks `descriptor.path` inside the matching record.
///
/// Returns `None` when no record has the type, when a key is missing, when an
/// intermediate value is not an object, or when the value is JSON `null`.
/// Absence is expected for optional metrics and is never an error.
pub fn extract<'a>(snapshot: &'a DeviceSnapshot, descriptor: &SensorDescriptor) -> Option<&'a Value> {
    let record = find_record(snapshot, descriptor.sensor_type)?;

    let value = descriptor
        .path
        .iter()
        .try_fold(record, |node, key| node.as_object()?.get(*key))?;

    (!value.is_null()).then_some(value)
}

/// Record types present in the snapshot.
pub fn available_types(snapshot: &DeviceSnapshot) -> BTreeSet<&str> {
    snapshot.values().filter_map(record_type).collect()
}
