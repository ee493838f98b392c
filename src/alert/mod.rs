// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Alert actuation seam

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

/// External alarm action, keyed by the triggering sensor's identifier.
///
/// `play_alert` resolves when playback completes; the correlator awaits it,
/// serializing playback with the countdown.
#[async_trait]
pub trait AlertActuator: Send + Sync {
    async fn play_alert(&self, sensor_id: &str) -> anyhow::Result<()>;
}

/// Demo actuator: logs the per-sensor sound and emulates playback time.
pub struct ConsoleAlert {
    sounds: HashMap<String, String>,
    playback: Duration,
}

impl ConsoleAlert {
    pub fn new(sounds: HashMap<String, String>, playback: Duration) -> Self {
        Self { sounds, playback }
    }
}

#[async_trait]
impl AlertActuator for ConsoleAlert {
    async fn play_alert(&self, sensor_id: &str) -> anyhow::Result<()> {
        let sound = self
            .sounds
            .get(sensor_id)
            .map(String::as_str)
            .unwrap_or("default.mp3");
        info!("Playing alert for {} ({})", sensor_id, sound);
        tokio::time::sleep(self.playback).await;
        Ok(())
    }
}
