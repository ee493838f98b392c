// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Mirrors severe tracing events into the report channel

use std::fmt::Write;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use super::ReportChannel;

/// Subscriber layer that copies every event at or above a severity
/// threshold into a [`ReportChannel`] as a single `LEVEL | message` line.
///
/// The layer owns nothing but the channel handle and the threshold, so
/// rebuilding a subscriber stack with a fresh layer can never double up
/// entries for a single log call. A formatting failure while rendering the
/// message is swallowed; it must not reach the call site that logged.
pub struct ReportLayer {
    channel: Arc<ReportChannel>,
    threshold: Level,
}

impl ReportLayer {
    /// Mirror error-and-above events into `channel`.
    pub fn new(channel: Arc<ReportChannel>) -> Self {
        Self::with_threshold(channel, Level::ERROR)
    }

    /// Mirror events at `threshold` severity or above.
    pub fn with_threshold(channel: Arc<ReportChannel>, threshold: Level) -> Self {
        Self { channel, threshold }
    }
}

impl<S: Subscriber> Layer<S> for ReportLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // tracing orders ERROR lowest, so "at least as severe" is <=
        if *metadata.level() > self.threshold {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if visitor.message.is_empty() {
            return;
        }

        self.channel
            .record(format!("{} | {}", metadata.level(), visitor.message));
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn channel_with_layer(
        threshold: Level,
    ) -> (Arc<ReportChannel>, impl Subscriber + Send + Sync) {
        let channel = Arc::new(ReportChannel::new(5));
        let layer = ReportLayer::with_threshold(channel.clone(), threshold);
        let subscriber = tracing_subscriber::registry().with(layer);
        (channel, subscriber)
    }

    #[test]
    fn test_errors_are_mirrored() {
        let (channel, subscriber) = channel_with_layer(Level::ERROR);
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("camera offline");
            tracing::info!("routine message");
            tracing::debug!("noise");
        });
        assert_eq!(channel.snapshot(), vec!["ERROR | camera offline".to_string()]);
    }

    #[test]
    fn test_formatted_messages_are_rendered() {
        let (channel, subscriber) = channel_with_layer(Level::ERROR);
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("camera {} obstructed", "cam-a");
        });
        assert_eq!(
            channel.snapshot(),
            vec!["ERROR | camera cam-a obstructed".to_string()]
        );
    }

    #[test]
    fn test_threshold_is_configurable() {
        let (channel, subscriber) = channel_with_layer(Level::WARN);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("frame capture slow");
            tracing::error!("frame capture failed");
            tracing::info!("frame captured");
        });
        let snapshot = channel.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0], "WARN | frame capture slow");
        assert_eq!(snapshot[1], "ERROR | frame capture failed");
    }

    #[test]
    fn test_channel_overflow_still_counts() {
        let (channel, subscriber) = channel_with_layer(Level::ERROR);
        tracing::subscriber::with_default(subscriber, || {
            for n in 0..8 {
                tracing::error!("failure {}", n);
            }
        });
        assert_eq!(channel.len(), 5);
        assert_eq!(channel.dropped_count(), 3);
    }
}
