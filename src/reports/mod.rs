// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/vigil-rs

//! Bounded error-report channel - producers never block, overflow is counted

mod bridge;

pub use bridge::ReportLayer;

use std::collections::VecDeque;
use parking_lot::Mutex;

/// Default number of buffered report lines.
pub const DEFAULT_CAPACITY: usize = 5;

struct ChannelState {
    entries: VecDeque<String>,
    dropped: u64,
}

/// Fixed-capacity FIFO of failure messages shared between any number of
/// producers and a polling consumer.
///
/// The buffer and the dropped counter are one unit of state behind a single
/// mutex; every operation is O(1) (snapshot is O(capacity)) and performs no
/// I/O under the lock.
pub struct ReportChannel {
    capacity: usize,
    inner: Mutex<ChannelState>,
}

impl ReportChannel {
    /// Create a channel holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(ChannelState {
                entries: VecDeque::with_capacity(capacity),
                dropped: 0,
            }),
        }
    }

    /// Append a message, evicting the oldest entry (and counting it as
    /// dropped) when the buffer is full. Never fails, never blocks on a
    /// consumer.
    pub fn record(&self, message: impl Into<String>) {
        let mut state = self.inner.lock();
        if self.capacity == 0 {
            state.dropped += 1;
            return;
        }
        if state.entries.len() >= self.capacity {
            state.entries.pop_front();
            state.dropped += 1;
        }
        state.entries.push_back(message.into());
    }

    /// All currently buffered messages, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        let state = self.inner.lock();
        state.entries.iter().cloned().collect()
    }

    /// Cumulative number of evicted messages since process start.
    /// Monotonically non-decreasing, never reset.
    pub fn dropped_count(&self) -> u64 {
        self.inner.lock().dropped
    }

    /// Number of messages currently buffered.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured maximum buffer length.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ReportChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
