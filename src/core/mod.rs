//! Core engine module - orchestrates capture, health and correlation

mod engine;

pub use engine::{CameraRig, Engine};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// System-wide state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemState {
    pub running: bool,
    pub frames_processed: u64,
    pub signals_emitted: u64,
    pub cameras_ok: bool,
    pub last_health_check: Option<DateTime<Utc>>,
}

impl Default for SystemState {
    fn default() -> Self {
        Self {
            running: false,
            frames_processed: 0,
            signals_emitted: 0,
            cameras_ok: false,
            last_health_check: None,
        }
    }
}
