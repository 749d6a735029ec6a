pub mod descriptors;
pub mod entity;
pub mod extract;

pub use descriptors::{SENSORS, SensorDescriptor};
pub use entity::{EntityState, SensorEntity, setup_entities, track_updates};
pub use extract::{available_types, extract};
