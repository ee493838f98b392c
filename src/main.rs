// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Vigil - Corroborated Edge Surveillance Node
//!
//! A dual-camera surveillance node that fires an alarm only on
//! corroborated detections, watches its own cameras for obstruction and
//! disconnection, and keeps every failure visible to the operator without
//! ever blocking the detection path.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use vigil::alert::ConsoleAlert;
use vigil::cameras::CameraSimulator;
use vigil::core::{CameraRig, Engine};
use vigil::detection::{Correlator, PairState};
use vigil::display::{ConsolePanel, StatusDisplay};
use vigil::inference::SimulatedDetector;
use vigil::reports::{ReportChannel, ReportLayer};
use vigil::{Config, VERSION};

/// Vigil - Corroborated Edge Surveillance Node
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(author = "Vigil Project")]
#[command(version = VERSION)]
#[command(about = "Corroborated dual-camera surveillance with self-diagnosing sensors")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Demo mode with simulated cameras and detector
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;
    if args.demo {
        config.demo_mode = true;
    }

    let log_level = if args.trace {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        config.log_level.as_str()
    };

    // Initialize logging: console output plus the operator report mirror
    let reports = Arc::new(ReportChannel::new(config.reports.capacity));
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(true),
        )
        .with(ReportLayer::with_threshold(
            reports.clone(),
            config.reports.mirror_threshold(),
        ))
        .init();

    info!("🚀 Vigil v{} - Corroborated Edge Surveillance Node", VERSION);
    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, reports))
}

async fn run(config: Config, reports: Arc<ReportChannel>) -> Result<()> {
    use tokio::sync::{broadcast, mpsc};

    if !config.demo_mode {
        anyhow::bail!("no physical camera backend configured; run with --demo");
    }
    if config.cameras.entries.len() != 2 {
        anyhow::bail!(
            "expected exactly 2 camera entries, found {}",
            config.cameras.entries.len()
        );
    }

    let config = Arc::new(config);

    // Camera pair + inference + actuator (demo implementations)
    let rigs: Vec<CameraRig> = config
        .cameras
        .entries
        .iter()
        .map(|entry| CameraRig {
            camera: Box::new(CameraSimulator::new(
                &entry.id,
                config.cameras.width,
                config.cameras.height,
            )),
            roi: entry.roi,
        })
        .collect();

    let detector = Arc::new(SimulatedDetector::new(0.05, "intruder"));

    let sounds: HashMap<String, String> = config
        .cameras
        .entries
        .iter()
        .map(|entry| (entry.id.clone(), entry.alert_sound.clone()))
        .collect();
    let actuator = Arc::new(ConsoleAlert::new(sounds, config.detection.alert_playback()));

    // Wiring: bounded signal queue into the correlator, broadcast shutdown
    let (signal_tx, signal_rx) = mpsc::channel(config.detection.signal_queue);
    let (shutdown_tx, _) = broadcast::channel(1);

    let correlator = Correlator::new(
        PairState::new(
            &config.cameras.entries[0].id,
            &config.cameras.entries[1].id,
            config.detection.trigger_threshold,
            config.detection.window_ticks,
        ),
        signal_rx,
        actuator,
        config.detection.tick_interval(),
    );
    let correlator_handle = tokio::spawn(correlator.run(shutdown_tx.subscribe()));

    let display = StatusDisplay::new(
        reports,
        Box::new(ConsolePanel),
        config.display.poll_interval(),
    );
    let display_handle = tokio::spawn(display.run(shutdown_tx.subscribe()));

    let mut engine = Engine::new(config, rigs, detector, signal_tx);
    let state = engine.state_handle();
    let engine_rx = shutdown_tx.subscribe();
    let engine_handle = tokio::spawn(async move { engine.run(engine_rx).await });

    info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, cleaning up...");

    let _ = shutdown_tx.send(());
    let _ = tokio::join!(engine_handle, correlator_handle, display_handle);

    let state = state.read().await;
    info!(
        "Vigil shutdown complete ({} frames processed, {} signals emitted)",
        state.frames_processed, state.signals_emitted
    );

    Ok(())
}
