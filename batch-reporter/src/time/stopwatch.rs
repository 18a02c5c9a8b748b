// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stopwatch for tracking how long a batch has been running.
//!
//! The start instant is fixed when the session is constructed and never reset. Elapsed time is
//! always measured against the injected [`Clock`], never the ambient wall clock.

use super::Clock;
use std::{
    fmt,
    time::{Duration, Instant},
};

/// The start state of a stopwatch.
pub(crate) struct Stopwatch {
    clock: Box<dyn Clock>,
    start: Instant,
}

impl Stopwatch {
    pub(crate) fn start(clock: Box<dyn Clock>) -> Self {
        let start = clock.now();
        Self { clock, start }
    }

    pub(crate) fn snapshot(&self) -> StopwatchSnapshot {
        StopwatchSnapshot {
            duration: self.clock.now().saturating_duration_since(self.start),
        }
    }
}

impl fmt::Debug for Stopwatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stopwatch")
            .field("clock", &self.clock)
            .field("start", &self.start)
            .finish()
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct StopwatchSnapshot {
    pub(crate) duration: Duration,
}

impl StopwatchSnapshot {
    /// Returns the elapsed time in whole milliseconds.
    pub(crate) fn millis(&self) -> u128 {
        self.duration.as_millis()
    }
}
