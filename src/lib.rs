// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Vigil - Corroborated Edge Surveillance Node
//!
//! A dual-camera perimeter surveillance node that:
//! - raises an alarm only when two independently-sampled cameras corroborate
//!   a detection within a bounded time window
//! - classifies its own cameras as usable/obstructed/disconnected from
//!   successive frame differences
//! - surfaces every failure to an operator display through a bounded,
//!   never-blocking report channel
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Vigil Engine                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐  │
//! │  │ Cameras │ → │ Watchdog │ → │ Inference │ → │Correlator│  │
//! │  │ (pair)  │   │ (gates)  │   │  (ROI)    │   │ (alarm)  │  │
//! │  └─────────┘   └──────────┘   └───────────┘   └──────────┘  │
//! │       ↓              ↓              ↓              ↓        │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │           tracing → ReportLayer → ReportChannel        │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │                            ↓                                │
//! │                    ┌──────────────┐                         │
//! │                    │StatusDisplay │  (independent poll)     │
//! │                    └──────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod alert;
pub mod cameras;
pub mod config;
pub mod core;
pub mod detection;
pub mod display;
pub mod health;
pub mod inference;
pub mod reports;

// Re-exports for convenience
pub use alert::AlertActuator;
pub use cameras::{Camera, CaptureError, Frame, Roi};
pub use config::Config;
pub use crate::core::{Engine, SystemState};
pub use detection::{AlarmEvent, Correlator, DetectionSignal, PairState};
pub use display::StatusDisplay;
pub use health::{HealthStatus, Watchdog};
pub use inference::{Detector, Inference};
pub use reports::{ReportChannel, ReportLayer};

/// Vigil version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Vigil name
pub const NAME: &str = "Vigil";
