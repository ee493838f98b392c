// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Object-detection seam

use parking_lot::Mutex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cameras::Frame;

/// One detection returned by the model for a frame region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inference {
    pub confidence: f64,
    pub label: String,
}

/// The detection model, consumed synchronously. Failures propagate to the
/// caller, which logs them; the core never retries an inference.
pub trait Detector: Send + Sync {
    fn infer(&self, region: &Frame) -> anyhow::Result<Vec<Inference>>;
}

/// Demo detector emitting occasional detections with random confidence.
pub struct SimulatedDetector {
    detection_probability: f64,
    label: String,
    rng: Mutex<rand::rngs::StdRng>,
}

impl SimulatedDetector {
    pub fn new(detection_probability: f64, label: &str) -> Self {
        Self {
            detection_probability,
            label: label.to_string(),
            rng: Mutex::new(rand::rngs::StdRng::from_entropy()),
        }
    }

    /// Deterministic variant for tests.
    pub fn seeded(detection_probability: f64, label: &str, seed: u64) -> Self {
        let detector = Self::new(detection_probability, label);
        *detector.rng.lock() = rand::rngs::StdRng::seed_from_u64(seed);
        detector
    }
}

impl Detector for SimulatedDetector {
    fn infer(&self, _region: &Frame) -> anyhow::Result<Vec<Inference>> {
        let mut rng = self.rng.lock();
        if rng.gen::<f64>() < self.detection_probability {
            Ok(vec![Inference {
                confidence: rng.gen_range(0.5..1.0),
                label: self.label.clone(),
            }])
        } else {
            Ok(vec![])
        }
    }
}
