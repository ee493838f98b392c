// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Camera simulator for demo/testing

use async_trait::async_trait;
use rand::prelude::*;
use rand_distr::Normal;

use super::{Camera, CaptureError, Frame};

/// Simulates a live camera feed for demo mode and tests.
///
/// A healthy feed is a drifting gradient with per-pixel sensor noise, so
/// successive frames always differ well above any sane obstruction
/// threshold. Obstruction and disconnection are togglable to exercise the
/// watchdog.
pub struct CameraSimulator {
    id: String,
    width: u32,
    height: u32,
    connected: bool,
    obstructed: bool,
    noise_sigma: f64,
    frame_count: u64,
    rng: rand::rngs::StdRng,
}

impl CameraSimulator {
    pub fn new(id: &str, width: u32, height: u32) -> Self {
        Self {
            id: id.to_string(),
            width,
            height,
            connected: true,
            obstructed: false,
            noise_sigma: 24.0,
            frame_count: 0,
            rng: rand::rngs::StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for tests.
    pub fn seeded(id: &str, width: u32, height: u32, seed: u64) -> Self {
        let mut sim = Self::new(id, width, height);
        sim.rng = rand::rngs::StdRng::seed_from_u64(seed);
        sim
    }

    /// Simulate the lens being covered: frames freeze to a constant value.
    pub fn set_obstructed(&mut self, obstructed: bool) {
        self.obstructed = obstructed;
    }

    /// Simulate the device handle going away.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    fn scene_frame(&mut self) -> Frame {
        let len = (self.width * self.height * 3) as usize;

        if self.obstructed {
            // covered lens: flat, variance-free
            return Frame::new(self.width, self.height, vec![8; len]);
        }

        let noise = Normal::new(0.0, self.noise_sigma).unwrap();
        let mut data = Vec::with_capacity(len);
        let phase = self.frame_count as u32;

        for y in 0..self.height {
            for x in 0..self.width {
                let base = ((x + y + phase) % 256) as f64;
                let v = (base + self.rng.sample(noise)).clamp(0.0, 255.0) as u8;
                data.extend_from_slice(&[v, v, v]);
            }
        }

        Frame::new(self.width, self.height, data)
    }
}

#[async_trait]
impl Camera for CameraSimulator {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn capture(&mut self) -> Result<Frame, CaptureError> {
        if !self.connected {
            return Err(CaptureError::Disconnected);
        }
        self.frame_count += 1;
        Ok(self.scene_frame())
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "width": self.width,
            "height": self.height,
            "noise_sigma": self.noise_sigma,
            "obstructed": self.obstructed,
        })
    }

    fn set_config(&mut self, config: serde_json::Value) -> anyhow::Result<()> {
        if let Some(sigma) = config.get("noise_sigma").and_then(|v| v.as_f64()) {
            self.noise_sigma = sigma;
        }
        if let Some(obstructed) = config.get("obstructed").and_then(|v| v.as_bool()) {
            self.obstructed = obstructed;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::frame_delta;

    #[tokio::test]
    async fn test_capture_produces_full_frames() {
        let mut sim = CameraSimulator::seeded("cam-a", 64, 48, 7);
        let frame = sim.capture().await.unwrap();
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 48);
        assert_eq!(frame.data.len(), 64 * 48 * 3);
    }

    #[tokio::test]
    async fn test_healthy_frames_differ() {
        let mut sim = CameraSimulator::seeded("cam-a", 64, 48, 7);
        let first = sim.capture().await.unwrap();
        let second = sim.capture().await.unwrap();
        assert!(frame_delta(&first, &second) > 10_000);
    }

    #[tokio::test]
    async fn test_obstructed_frames_are_static() {
        let mut sim = CameraSimulator::seeded("cam-a", 64, 48, 7);
        sim.set_obstructed(true);
        let first = sim.capture().await.unwrap();
        let second = sim.capture().await.unwrap();
        assert_eq!(frame_delta(&first, &second), 0);
    }

    #[tokio::test]
    async fn test_disconnected_capture_fails() {
        let mut sim = CameraSimulator::new("cam-a", 64, 48);
        sim.set_connected(false);
        assert!(matches!(
            sim.capture().await,
            Err(CaptureError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_obstruction_togglable_through_config() {
        let mut sim = CameraSimulator::seeded("cam-a", 32, 32, 7);
        sim.set_config(serde_json::json!({ "obstructed": true })).unwrap();
        let first = sim.capture().await.unwrap();
        let second = sim.capture().await.unwrap();
        assert_eq!(frame_delta(&first, &second), 0);
    }
}
