// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Camera traits and frame types

mod simulator;

pub use simulator::CameraSimulator;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a capture attempt produced no frame.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The camera handle is closed or the device is gone.
    #[error("camera is not connected")]
    Disconnected,
    /// The device is open but returned no frame.
    #[error("no frame returned: {0}")]
    ReadFailed(String),
}

/// Region of interest within a frame, in pixel coordinates.
///
/// `(x1, y1)` is the top-left corner, `(x2, y2)` the exclusive bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Roi {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }
}

/// A single captured frame, RGB8 row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 3) as usize);
        Self {
            width,
            height,
            data,
            timestamp: Utc::now(),
        }
    }

    /// Single-channel intensity representation (ITU-R 601 integer weights).
    pub fn luma(&self) -> Vec<u8> {
        self.data
            .chunks_exact(3)
            .map(|px| {
                let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
                ((r * 299 + g * 587 + b * 114) / 1000) as u8
            })
            .collect()
    }

    /// Copy out the region of interest, clamped to the frame bounds.
    pub fn crop(&self, roi: &Roi) -> Frame {
        let x1 = roi.x1.min(self.width);
        let y1 = roi.y1.min(self.height);
        let x2 = roi.x2.min(self.width);
        let y2 = roi.y2.min(self.height);
        let (w, h) = (x2.saturating_sub(x1), y2.saturating_sub(y1));

        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for row in y1..y2 {
            let start = ((row * self.width + x1) * 3) as usize;
            let end = start + (w * 3) as usize;
            data.extend_from_slice(&self.data[start..end]);
        }

        Frame {
            width: w,
            height: h,
            data,
            timestamp: self.timestamp,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }
}

/// A synchronously-sampled frame source.
///
/// Capture failures are values, not panics; the health watchdog translates
/// them into a [`crate::health::HealthStatus`] classification.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Stable identifier, one of the configured pair (e.g. "cam-a").
    fn id(&self) -> &str;

    /// Whether the underlying handle is open.
    fn is_connected(&self) -> bool;

    /// Produce the next frame.
    async fn capture(&mut self) -> Result<Frame, CaptureError>;

    /// Source-specific configuration blob.
    fn config(&self) -> serde_json::Value;

    /// Update source-specific configuration.
    fn set_config(&mut self, config: serde_json::Value) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(width, height, vec![value; (width * height * 3) as usize])
    }

    #[test]
    fn test_luma_of_gray_pixels_is_identity() {
        let frame = flat_frame(4, 4, 120);
        assert!(frame.luma().iter().all(|&v| v == 120));
    }

    #[test]
    fn test_crop_dimensions() {
        let frame = flat_frame(640, 480, 10);
        let roi = Roi::new(400, 0, 640, 480);
        let cropped = frame.crop(&roi);
        assert_eq!(cropped.width, 240);
        assert_eq!(cropped.height, 480);
        assert_eq!(cropped.data.len(), 240 * 480 * 3);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let frame = flat_frame(100, 100, 10);
        let roi = Roi::new(50, 50, 400, 400);
        let cropped = frame.crop(&roi);
        assert_eq!(cropped.width, 50);
        assert_eq!(cropped.height, 50);
    }

    #[test]
    fn test_crop_preserves_pixels() {
        let mut data = vec![0u8; 4 * 4 * 3];
        // mark pixel (2, 1)
        let idx = (1 * 4 + 2) * 3;
        data[idx] = 200;
        data[idx + 1] = 200;
        data[idx + 2] = 200;
        let frame = Frame::new(4, 4, data);

        let cropped = frame.crop(&Roi::new(2, 1, 4, 3));
        assert_eq!(cropped.width, 2);
        assert_eq!(cropped.height, 2);
        assert_eq!(cropped.data[0], 200);
    }
}
