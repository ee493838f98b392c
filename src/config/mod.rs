// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Configuration module

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cameras::Roi;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Log level
    pub log_level: String,

    /// Enable demo mode (simulated cameras and detector)
    pub demo_mode: bool,

    /// Camera configuration
    pub cameras: CamerasConfig,

    /// Detection correlation configuration
    pub detection: DetectionConfig,

    /// Health watchdog configuration
    pub health: HealthConfig,

    /// Error report channel configuration
    pub reports: ReportsConfig,

    /// Status display configuration
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Vigil".to_string(),
            log_level: "info".to_string(),
            demo_mode: true,
            cameras: CamerasConfig::default(),
            detection: DetectionConfig::default(),
            health: HealthConfig::default(),
            reports: ReportsConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("vigil"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// One camera of the corroborating pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraEntry {
    /// Stable sensor identifier
    pub id: String,

    /// Region of interest routed to inference
    pub roi: Roi,

    /// Alert sound played when this camera triggers the alarm
    pub alert_sound: String,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CamerasConfig {
    /// Frame dimensions for simulated sources
    pub width: u32,
    pub height: u32,

    /// Pause between capture cycles in milliseconds
    pub frame_interval_ms: u64,

    /// The sensor pair
    pub entries: Vec<CameraEntry>,
}

impl CamerasConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl Default for CamerasConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_interval_ms: 100,
            entries: vec![
                CameraEntry {
                    id: "cam-a".to_string(),
                    roi: Roi::new(400, 0, 640, 480),
                    alert_sound: "alert_a.mp3".to_string(),
                },
                CameraEntry {
                    id: "cam-b".to_string(),
                    roi: Roi::new(0, 0, 300, 480),
                    alert_sound: "alert_b.mp3".to_string(),
                },
            ],
        }
    }
}

/// Detection correlation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Confidence above which a crossing arms a sensor
    pub trigger_threshold: f64,

    /// Corroboration window length in ticks
    pub window_ticks: u32,

    /// Tick length in milliseconds
    pub tick_interval_ms: u64,

    /// Bound of the detection-signal queue into the correlator
    pub signal_queue: usize,

    /// Emulated alert playback length in milliseconds (demo actuator)
    pub alert_playback_ms: u64,
}

impl DetectionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn alert_playback(&self) -> Duration {
        Duration::from_millis(self.alert_playback_ms)
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            trigger_threshold: 0.83,
            window_ticks: 5,
            tick_interval_ms: 1000,
            signal_queue: 64,
            alert_playback_ms: 1500,
        }
    }
}

/// Health watchdog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Seconds between aggregate camera checks
    pub check_interval_secs: u64,

    /// Settle wait between the two probe samples, milliseconds
    pub settle_ms: u64,

    /// Grayscale absolute-difference sum below which a feed is obstructed
    pub diff_threshold: u64,

    /// Pause before retrying when no camera is usable, milliseconds
    pub retry_backoff_ms: u64,
}

impl HealthConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            settle_ms: 1000,
            diff_threshold: 500_000,
            retry_backoff_ms: 2000,
        }
    }
}

/// Error report channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Maximum buffered report lines
    pub capacity: usize,

    /// Minimum severity mirrored into the channel ("error" or "warn")
    pub mirror_level: String,
}

impl ReportsConfig {
    /// Parse the mirror severity, falling back to error-and-above.
    pub fn mirror_threshold(&self) -> tracing::Level {
        self.mirror_level
            .parse()
            .unwrap_or(tracing::Level::ERROR)
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            mirror_level: "error".to_string(),
        }
    }
}

/// Status display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Poll cadence of the report channel, milliseconds
    pub poll_interval_ms: u64,
}

impl DisplayConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}
