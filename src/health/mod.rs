// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Camera health watchdog - classifies feeds as usable, obstructed or gone

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::cameras::{Camera, Frame};
use crate::config::HealthConfig;

/// Classification of a camera feed's trustworthiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// The feed shows normal inter-frame variance.
    Usable,
    /// Successive frames are near-static (blocked lens) or unreadable.
    Obstructed,
    /// The device handle is closed or gone.
    Disconnected,
}

impl HealthStatus {
    /// True only for [`HealthStatus::Usable`].
    pub fn is_usable(&self) -> bool {
        matches!(self, HealthStatus::Usable)
    }
}

/// Sum of absolute per-pixel grayscale differences between two frames.
pub fn frame_delta(first: &Frame, second: &Frame) -> u64 {
    let a = first.luma();
    let b = second.luma();
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x as i64 - y as i64).unsigned_abs())
        .sum()
}

/// Classifies camera feeds from two temporally-separated samples.
///
/// A probe consumes two real frames (with a settle wait in between) from
/// the same physical source the detection loop reads, so callers keep it on
/// a coarse cadence rather than the per-frame path.
pub struct Watchdog {
    diff_threshold: u64,
    settle: Duration,
}

impl Watchdog {
    pub fn new(diff_threshold: u64, settle: Duration) -> Self {
        Self {
            diff_threshold,
            settle,
        }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new(config.diff_threshold, config.settle())
    }

    /// Classify one camera. Always returns a status; under ambiguity
    /// (unreadable frames) the feed is treated as blocked.
    pub async fn probe(&self, camera: &mut dyn Camera) -> HealthStatus {
        if !camera.is_connected() {
            return HealthStatus::Disconnected;
        }

        let first = match camera.capture().await {
            Ok(frame) => frame,
            Err(e) => {
                error!("Health probe could not read {}: {}", camera.id(), e);
                return HealthStatus::Obstructed;
            }
        };

        tokio::time::sleep(self.settle).await;

        let second = match camera.capture().await {
            Ok(frame) => frame,
            Err(e) => {
                error!("Health probe could not read {}: {}", camera.id(), e);
                return HealthStatus::Obstructed;
            }
        };

        let delta = frame_delta(&first, &second);
        debug!("Camera {} inter-frame delta: {}", camera.id(), delta);

        if delta < self.diff_threshold {
            HealthStatus::Obstructed
        } else {
            HealthStatus::Usable
        }
    }

    /// Probe every camera and decide whether the capture pipeline may run
    /// this cycle.
    ///
    /// Total failure (no usable camera) produces a single critical-marked
    /// record; partial failure produces one error record per bad camera.
    pub async fn verify_cameras(&self, cameras: &mut [&mut (dyn Camera + 'static)]) -> bool {
        let mut statuses = Vec::with_capacity(cameras.len());
        for camera in cameras.iter_mut() {
            let status = self.probe(&mut **camera).await;
            statuses.push((camera.id().to_string(), status));
        }

        if !statuses.is_empty() && statuses.iter().all(|(_, s)| !s.is_usable()) {
            error!("CRITICAL: all cameras unusable, detection pipeline halted");
            return false;
        }

        let mut ok = true;
        for (id, status) in &statuses {
            match status {
                HealthStatus::Usable => {}
                HealthStatus::Obstructed => {
                    error!("Camera {} obstructed", id);
                    ok = false;
                }
                HealthStatus::Disconnected => {
                    error!("Camera {} disconnected", id);
                    ok = false;
                }
            }
        }
        ok
    }
}
