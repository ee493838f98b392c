//! Detection correlation - turns per-frame confidence crossings into one
//! debounced alarm decision

mod correlator;

pub use correlator::{Correlator, PairState, SensorState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sensor's confidence reading for one processed frame. Ephemeral:
/// only its effect on the pair state matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSignal {
    pub sensor_id: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl DetectionSignal {
    pub fn new(sensor_id: &str, confidence: f64) -> Self {
        Self {
            sensor_id: sensor_id.to_string(),
            confidence,
            timestamp: Utc::now(),
        }
    }
}

/// A corroborated detection, fired at most once per alarm window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmEvent {
    pub id: String,
    /// The sensor whose crossing opened the window.
    pub sensor_id: String,
    /// The partner sensor that corroborated it.
    pub corroborated_by: String,
    /// Ticks elapsed between arming and corroboration.
    pub elapsed_ticks: u32,
    pub timestamp: DateTime<Utc>,
}
