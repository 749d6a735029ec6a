/// Static definition of one metric: which record to pick and where its value
/// lives inside that record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescriptor {
    /// Stable id, part of the entity id
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    /// Matches the record's `"type"` field
    pub sensor_type: &'static str,
    /// Object keys walked from the record down to the value
    pub path: &'static [&'static str],
}

/// Every metric a Sense may report. Devices only expose a subset; entities
/// are created for the types present in the first snapshot.
pub const SENSORS: &[SensorDescriptor] = &[
    SensorDescriptor {
        key: "temperature",
        name: "Temperature",
        unit: Some("°C"),
        sensor_type: "temp",
        path: &["parameter", "temperature", "value"],
    },
    SensorDescriptor {
        key: "humidity",
        name: "Humidity",
        unit: Some("%"),
        sensor_type: "rh",
        path: &["parameter", "humidity", "value"],
    },
    SensorDescriptor {
        key: "absolute_humidity",
        name: "Absolute humidity",
        unit: Some("g/kg"),
        sensor_type: "ah",
        path: &["parameter", "humidity", "value"],
    },
    SensorDescriptor {
        key: "voc",
        name: "VOC",
        unit: Some("ppm"),
        sensor_type: "avoc",
        path: &["parameter", "raw", "value"],
    },
    SensorDescriptor {
        key: "pressure",
        name: "Pressure",
        unit: Some("Pa"),
        sensor_type: "press",
        path: &["parameter", "pressure", "value"],
    },
    SensorDescriptor {
        key: "heap",
        name: "Heap average",
        unit: None,
        sensor_type: "heap_info",
        path: &["parameter", "average_current_heap", "value"],
    },
    SensorDescriptor {
        key: "rssi",
        name: "Wi-Fi RSSI",
        unit: Some("dBm"),
        sensor_type: "rssi",
        path: &["parameter", "rssi", "value"],
    },
    // Optional types, not present on every device
    SensorDescriptor {
        key: "co2",
        name: "CO2 concentration",
        unit: Some("ppm"),
        sensor_type: "co2",
        path: &["parameter", "concentration", "value"],
    },
    SensorDescriptor {
        key: "lux",
        name: "Light level",
        unit: Some("lx"),
        sensor_type: "lux",
        path: &["parameter", "lux", "value"],
    },
    SensorDescriptor {
        key: "sound",
        name: "Sound level",
        unit: None,
        sensor_type: "sound",
        path: &["parameter", "average_level", "value"],
    },
];

pub fn find(key: &str) -> Option<&'static SensorDescriptor> {
    SENSORS.iter().find(|d| d.key == key)
}
