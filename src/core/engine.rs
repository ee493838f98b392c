//! Capture engine - runs the frame → inference → signal cycle and gates it
//! on camera health

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use super::SystemState;
use crate::cameras::{Camera, Roi};
use crate::config::Config;
use crate::detection::DetectionSignal;
use crate::health::Watchdog;
use crate::inference::Detector;

/// One camera plus the frame region routed to inference.
pub struct CameraRig {
    pub camera: Box<dyn Camera>,
    pub roi: Roi,
}

/// Main capture engine.
///
/// Owns the camera pair exclusively; the watchdog probe and the capture
/// cycle are interleaved on one task, so probing never races a capture on
/// the same handle.
pub struct Engine {
    config: Arc<Config>,
    rigs: Vec<CameraRig>,
    detector: Arc<dyn Detector>,
    signal_tx: mpsc::Sender<DetectionSignal>,
    watchdog: Watchdog,
    state: Arc<RwLock<SystemState>>,
    last_check: Option<Instant>,
}

impl Engine {
    pub fn new(
        config: Arc<Config>,
        rigs: Vec<CameraRig>,
        detector: Arc<dyn Detector>,
        signal_tx: mpsc::Sender<DetectionSignal>,
    ) -> Self {
        let watchdog = Watchdog::from_config(&config.health);
        Self {
            config,
            rigs,
            detector,
            signal_tx,
            watchdog,
            state: Arc::new(RwLock::new(SystemState::default())),
            last_check: None,
        }
    }

    /// Shared handle to the engine's counters.
    pub fn state_handle(&self) -> Arc<RwLock<SystemState>> {
        self.state.clone()
    }

    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) -> anyhow::Result<()> {
        info!("Starting capture engine...");
        {
            let mut state = self.state.write().await;
            state.running = true;
        }

        let frame_interval = self.config.cameras.frame_interval();

        loop {
            tokio::select! {
                _ = tokio::time::sleep(frame_interval) => {
                    self.cycle().await;
                }
                _ = shutdown.recv() => {
                    info!("Capture engine shutting down...");
                    break;
                }
            }
        }

        {
            let mut state = self.state.write().await;
            state.running = false;
        }
        Ok(())
    }

    async fn cycle(&mut self) {
        // the probe eats two frames per camera, keep it off the per-frame path
        let check_due = self
            .last_check
            .map(|t| t.elapsed() >= self.config.health.check_interval())
            .unwrap_or(true);

        if check_due {
            let mut handles: Vec<&mut (dyn Camera + 'static)> = self
                .rigs
                .iter_mut()
                .map(|rig| rig.camera.as_mut())
                .collect();
            let ok = self.watchdog.verify_cameras(&mut handles).await;

            {
                let mut state = self.state.write().await;
                state.cameras_ok = ok;
                state.last_health_check = Some(Utc::now());
            }

            // cameras stay suspect until a check passes: back off and
            // re-verify next cycle instead of capturing from a bad feed
            if !ok {
                tokio::time::sleep(self.config.health.retry_backoff()).await;
                return;
            }
            self.last_check = Some(Instant::now());
        }

        for rig in &mut self.rigs {
            let frame = match rig.camera.capture().await {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Could not capture frame from {}: {}", rig.camera.id(), e);
                    continue;
                }
            };

            let region = frame.crop(&rig.roi);
            let inferences = match self.detector.infer(&region) {
                Ok(inferences) => inferences,
                Err(e) => {
                    error!("Inference failed for {}: {}", rig.camera.id(), e);
                    continue;
                }
            };

            let mut state = self.state.write().await;
            state.frames_processed += 1;

            for inference in inferences {
                debug!(
                    "{} reported {} at {:.1}%",
                    rig.camera.id(),
                    inference.label,
                    inference.confidence * 100.0
                );
                let signal = DetectionSignal::new(rig.camera.id(), inference.confidence);
                // the detection path never blocks on the correlator
                match self.signal_tx.try_send(signal) {
                    Ok(()) => state.signals_emitted += 1,
                    Err(e) => warn!("Detection signal dropped: {}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::alert::AlertActuator;
    use crate::cameras::{CameraSimulator, Frame};
    use crate::detection::{Correlator, PairState};
    use crate::inference::Inference;

    struct FixedDetector {
        confidence: f64,
    }

    impl Detector for FixedDetector {
        fn infer(&self, _region: &Frame) -> anyhow::Result<Vec<Inference>> {
            Ok(vec![Inference {
                confidence: self.confidence,
                label: "intruder".to_string(),
            }])
        }
    }

    struct RecordingActuator {
        played: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl AlertActuator for RecordingActuator {
        async fn play_alert(&self, sensor_id: &str) -> anyhow::Result<()> {
            self.played.lock().push(sensor_id.to_string());
            Ok(())
        }
    }

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.cameras.width = 64;
        config.cameras.height = 64;
        config.cameras.frame_interval_ms = 10;
        config.detection.tick_interval_ms = 20;
        config.health.settle_ms = 0;
        config.health.check_interval_secs = 3600;
        config.health.diff_threshold = 1_000;
        config
    }

    #[tokio::test]
    async fn test_demo_pipeline_fires_corroborated_alarm() {
        let config = Arc::new(fast_config());

        let rigs = config
            .cameras
            .entries
            .iter()
            .enumerate()
            .map(|(n, entry)| CameraRig {
                camera: Box::new(CameraSimulator::seeded(
                    &entry.id,
                    config.cameras.width,
                    config.cameras.height,
                    n as u64,
                )) as Box<dyn Camera>,
                roi: entry.roi,
            })
            .collect();

        let detector = Arc::new(FixedDetector { confidence: 0.9 });
        let actuator = Arc::new(RecordingActuator {
            played: Mutex::new(Vec::new()),
        });

        let (signal_tx, signal_rx) = mpsc::channel(config.detection.signal_queue);
        let (shutdown_tx, _) = broadcast::channel(1);

        let correlator = Correlator::new(
            PairState::new("cam-a", "cam-b", 0.83, 5),
            signal_rx,
            actuator.clone(),
            config.detection.tick_interval(),
        );
        let correlator_handle = tokio::spawn(correlator.run(shutdown_tx.subscribe()));

        let mut engine = Engine::new(config, rigs, detector, signal_tx);
        let state = engine.state_handle();
        let engine_rx = shutdown_tx.subscribe();
        let engine_handle = tokio::spawn(async move { engine.run(engine_rx).await });

        tokio::time::sleep(Duration::from_millis(400)).await;
        let _ = shutdown_tx.send(());
        engine_handle.await.unwrap().unwrap();
        correlator_handle.await.unwrap().unwrap();

        let played = actuator.played.lock();
        assert!(!played.is_empty(), "corroborated alarm should have fired");
        assert!(played.iter().all(|id| id == "cam-a" || id == "cam-b"));

        let state = state.read().await;
        assert!(state.frames_processed > 0);
        assert!(state.cameras_ok);
    }
}
