// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Operator status display - polls the report channel on its own cadence

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::info;

use crate::reports::ReportChannel;

/// Rendering surface for the operator screen. The core only decides WHAT
/// to show; layout belongs to the panel implementation.
pub trait StatusPanel: Send {
    /// No buffered reports: show the default screen.
    fn show_idle(&mut self);
    /// Show buffered reports oldest-first, plus the count of evicted ones.
    fn show_reports(&mut self, reports: &[String], dropped: u64);
}

/// Panel writing to stdout.
pub struct ConsolePanel;

impl StatusPanel for ConsolePanel {
    fn show_idle(&mut self) {
        println!("--- VIGIL: all systems nominal ---");
    }

    fn show_reports(&mut self, reports: &[String], dropped: u64) {
        for line in render_report_lines(reports, dropped) {
            println!("{}", line);
        }
    }
}

/// Format the report screen: header, one line per report, and a trailing
/// `+N more` marker when evictions have hidden older reports.
pub(crate) fn render_report_lines(reports: &[String], dropped: u64) -> Vec<String> {
    let mut lines = Vec::with_capacity(reports.len() + 2);
    lines.push("--- FAILURES DETECTED ---".to_string());
    for report in reports {
        lines.push(format!("- {}", report));
    }
    if dropped > 0 {
        lines.push(format!("+{} more", dropped));
    }
    lines
}

/// Polls the report channel independently of the detection path and pushes
/// changes to a [`StatusPanel`].
pub struct StatusDisplay {
    channel: Arc<ReportChannel>,
    panel: Box<dyn StatusPanel>,
    poll_interval: Duration,
}

impl StatusDisplay {
    pub fn new(
        channel: Arc<ReportChannel>,
        panel: Box<dyn StatusPanel>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            channel,
            panel,
            poll_interval,
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> anyhow::Result<()> {
        info!("Starting status display...");

        let mut ticker = tokio::time::interval(self.poll_interval);
        let mut last: Option<(Vec<String>, u64)> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reports = self.channel.snapshot();
                    let dropped = self.channel.dropped_count();

                    let current = (reports, dropped);
                    if last.as_ref() == Some(&current) {
                        continue;
                    }

                    if current.0.is_empty() {
                        self.panel.show_idle();
                    } else {
                        self.panel.show_reports(&current.0, current.1);
                    }
                    last = Some(current);
                }
                _ = shutdown.recv() => {
                    info!("Status display shutting down...");
                    break;
                }
            }
        }

        Ok(())
    }
}
