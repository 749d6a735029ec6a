use std::sync::Arc;

use crate::integration::Integration;

pub mod health;
pub mod sensors;

pub use health::health;
pub use sensors::{get_sensor, list_sensors};

/// Shared per-instance context handed to every handler
pub type AppState = Arc<Integration>;
