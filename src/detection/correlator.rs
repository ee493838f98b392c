//! Per-pair alarm state machine and its driving task

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::{AlarmEvent, DetectionSignal};
use crate::alert::AlertActuator;

/// Per-sensor correlation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    Idle,
    Armed,
}

struct AlarmWindow {
    trigger: usize,
    elapsed: u32,
}

/// Owned correlation state for one sensor pair.
///
/// Exactly one task drives this struct, so arming and the check-and-reset
/// step cannot interleave; the invariant of at most one open window per
/// pair holds by construction.
pub struct PairState {
    ids: [String; 2],
    states: [SensorState; 2],
    window: Option<AlarmWindow>,
    trigger_threshold: f64,
    window_ticks: u32,
}

impl PairState {
    pub fn new(first: &str, second: &str, trigger_threshold: f64, window_ticks: u32) -> Self {
        Self {
            ids: [first.to_string(), second.to_string()],
            states: [SensorState::Idle, SensorState::Idle],
            window: None,
            trigger_threshold,
            window_ticks,
        }
    }

    fn index_of(&self, sensor_id: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == sensor_id)
    }

    /// Current state of one sensor, if it belongs to this pair.
    pub fn state_of(&self, sensor_id: &str) -> Option<SensorState> {
        self.index_of(sensor_id).map(|idx| self.states[idx])
    }

    /// True while a corroboration window is counting down.
    pub fn window_open(&self) -> bool {
        self.window.is_some()
    }

    /// Feed one signal into the machine. Returns true when the signal
    /// armed its sensor (fresh crossing above threshold on an idle sensor);
    /// crossings on an already-armed sensor are ignored.
    pub fn on_signal(&mut self, signal: &DetectionSignal) -> bool {
        let Some(idx) = self.index_of(&signal.sensor_id) else {
            warn!("Signal from unknown sensor {} ignored", signal.sensor_id);
            return false;
        };

        if signal.confidence <= self.trigger_threshold {
            return false;
        }
        if self.states[idx] == SensorState::Armed {
            return false;
        }

        self.states[idx] = SensorState::Armed;
        if self.window.is_none() {
            self.window = Some(AlarmWindow {
                trigger: idx,
                elapsed: 0,
            });
        }
        true
    }

    /// Advance the open window by one tick. Corroboration is checked
    /// before expiry, so arming on the final tick still fires.
    pub fn on_tick(&mut self) -> Option<AlarmEvent> {
        let window = self.window.as_mut()?;
        window.elapsed += 1;
        let trigger = window.trigger;
        let elapsed = window.elapsed;
        let partner = 1 - trigger;

        if self.states[trigger] == SensorState::Armed
            && self.states[partner] == SensorState::Armed
        {
            let event = AlarmEvent {
                id: uuid::Uuid::new_v4().to_string(),
                sensor_id: self.ids[trigger].clone(),
                corroborated_by: self.ids[partner].clone(),
                elapsed_ticks: elapsed,
                timestamp: Utc::now(),
            };
            self.reset();
            return Some(event);
        }

        if elapsed >= self.window_ticks {
            debug!(
                "Corroboration window for {} expired without partner",
                self.ids[trigger]
            );
            self.reset();
        }
        None
    }

    /// Return both sensors to idle and close any open window.
    pub fn reset(&mut self) {
        self.states = [SensorState::Idle, SensorState::Idle];
        self.window = None;
    }
}

/// Drives a [`PairState`] from a bounded signal channel and a tick clock,
/// firing the actuator on corroborated detections.
pub struct Correlator {
    state: PairState,
    rx: mpsc::Receiver<DetectionSignal>,
    actuator: Arc<dyn AlertActuator>,
    tick: Duration,
}

impl Correlator {
    pub fn new(
        state: PairState,
        rx: mpsc::Receiver<DetectionSignal>,
        actuator: Arc<dyn AlertActuator>,
        tick: Duration,
    ) -> Self {
        Self {
            state,
            rx,
            actuator,
            tick,
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> anyhow::Result<()> {
        info!("Starting detection correlator...");

        let mut ticker = tokio::time::interval(self.tick);
        // alert playback can outlast a tick; do not burst to catch up
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(signal) = self.rx.recv() => {
                    if self.state.on_signal(&signal) {
                        info!(
                            "Sensor {} armed at {:.1}% confidence",
                            signal.sensor_id,
                            signal.confidence * 100.0
                        );
                    }
                }
                _ = ticker.tick() => {
                    if let Some(alarm) = self.state.on_tick() {
                        info!(
                            "🚨 Alarm fired after {}s (triggered by {}, corroborated by {})",
                            alarm.elapsed_ticks, alarm.sensor_id, alarm.corroborated_by
                        );
                        // pair state is already reset; playback failure is non-fatal
                        if let Err(e) = self.actuator.play_alert(&alarm.sensor_id).await {
                            error!("Alert playback failed for {}: {}", alarm.sensor_id, e);
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Correlator shutting down...");
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn pair() -> PairState {
        PairState::new("cam-a", "cam-b", 0.83, 5)
    }

    fn signal(sensor: &str, confidence: f64) -> DetectionSignal {
        DetectionSignal::new(sensor, confidence)
    }

    #[test]
    fn test_corroboration_fires_once_attributed_to_first() {
        let mut state = pair();
        assert!(state.on_signal(&signal("cam-a", 0.9)));
        assert!(state.on_tick().is_none());
        assert!(state.on_tick().is_none());
        assert!(state.on_signal(&signal("cam-b", 0.95)));

        let alarm = state.on_tick().expect("alarm should fire");
        assert_eq!(alarm.sensor_id, "cam-a");
        assert_eq!(alarm.corroborated_by, "cam-b");
        assert_eq!(alarm.elapsed_ticks, 3);

        // both reset, no refire
        assert_eq!(state.state_of("cam-a"), Some(SensorState::Idle));
        assert_eq!(state.state_of("cam-b"), Some(SensorState::Idle));
        assert!(state.on_tick().is_none());
    }

    #[test]
    fn test_lone_arming_resets_after_window() {
        let mut state = pair();
        assert!(state.on_signal(&signal("cam-a", 0.9)));
        for _ in 0..5 {
            assert!(state.on_tick().is_none());
        }
        assert_eq!(state.state_of("cam-a"), Some(SensorState::Idle));
        assert!(!state.window_open());
    }

    #[test]
    fn test_corroboration_on_final_tick_still_fires() {
        let mut state = pair();
        assert!(state.on_signal(&signal("cam-a", 0.9)));
        for _ in 0..4 {
            assert!(state.on_tick().is_none());
        }
        assert!(state.on_signal(&signal("cam-b", 0.9)));
        let alarm = state.on_tick().expect("boundary corroboration fires");
        assert_eq!(alarm.sensor_id, "cam-a");
        assert_eq!(alarm.elapsed_ticks, 5);
    }

    #[test]
    fn test_late_partner_does_not_fire() {
        let mut state = pair();
        assert!(state.on_signal(&signal("cam-a", 0.9)));
        for _ in 0..5 {
            assert!(state.on_tick().is_none());
        }
        // window expired; partner arriving now opens a fresh window instead
        assert!(state.on_signal(&signal("cam-b", 0.9)));
        for _ in 0..5 {
            assert!(state.on_tick().is_none());
        }
        assert_eq!(state.state_of("cam-b"), Some(SensorState::Idle));
    }

    #[test]
    fn test_below_threshold_is_ignored() {
        let mut state = pair();
        assert!(!state.on_signal(&signal("cam-a", 0.83)));
        assert!(!state.on_signal(&signal("cam-a", 0.5)));
        assert!(!state.window_open());
    }

    #[test]
    fn test_recrossing_while_armed_is_ignored() {
        let mut state = pair();
        assert!(state.on_signal(&signal("cam-a", 0.9)));
        assert!(!state.on_signal(&signal("cam-a", 0.99)));
        assert!(state.on_tick().is_none());
        assert!(state.on_signal(&signal("cam-b", 0.9)));
        let alarm = state.on_tick().expect("single alarm");
        assert_eq!(alarm.sensor_id, "cam-a");
    }

    #[test]
    fn test_unknown_sensor_is_ignored() {
        let mut state = pair();
        assert!(!state.on_signal(&signal("cam-z", 0.99)));
        assert!(!state.window_open());
    }

    #[test]
    fn test_simultaneous_arming_attributes_to_first_signal() {
        let mut state = pair();
        assert!(state.on_signal(&signal("cam-b", 0.9)));
        assert!(state.on_signal(&signal("cam-a", 0.9)));
        let alarm = state.on_tick().expect("alarm should fire");
        assert_eq!(alarm.sensor_id, "cam-b");
        assert_eq!(alarm.elapsed_ticks, 1);
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

    #[tokio::test]
    async fn test_run_loop_fires_actuator_once() {
        let actuator = Arc::new(RecordingActuator {
            played: Mutex::new(Vec::new()),
        });
        let (tx, rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let correlator = Correlator::new(
            PairState::new("cam-a", "cam-b", 0.83, 5),
            rx,
            actuator.clone(),
            Duration::from_millis(10),
        );
        let handle = tokio::spawn(correlator.run(shutdown_rx));

        tx.send(DetectionSignal::new("cam-a", 0.9)).await.unwrap();
        tx.send(DetectionSignal::new("cam-b", 0.9)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let _ = shutdown_tx.send(());
        handle.await.unwrap().unwrap();

        assert_eq!(*actuator.played.lock(), vec!["cam-a".to_string()]);
    }
}
