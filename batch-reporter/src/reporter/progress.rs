// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The live status line.
//!
//! On an interactive terminal the line is cleared and rewritten in place on every render. Anywhere
//! else (a file, a pipe, CI logs) each render is appended as its own line, with no control
//! sequences, so that captured output stays readable.

use super::{
    aggregator::BatchState,
    helpers::{SPINNER_FRAMES, round_half_up},
};
use crate::output::{LineControl, StatusLine};
use std::{fmt, io, time::Duration};
use tracing::debug;

/// How the status line is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    /// Clear the line, then rewrite it in place.
    Interactive,

    /// Append each render as a new line.
    Streamed,
}

impl RenderTarget {
    /// Picks a target based on whether the status line is an interactive terminal.
    pub fn detect(line: &dyn StatusLine) -> Self {
        let target = if line.is_terminal() {
            Self::Interactive
        } else {
            Self::Streamed
        };
        debug!("status line render target: {target:?}");
        target
    }
}

/// A snapshot of everything shown on the status line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RenderState {
    pub(crate) spinner: char,
    pub(crate) percent: f64,
    pub(crate) current: usize,
    pub(crate) total: usize,
    pub(crate) throughput: f64,
    pub(crate) coverage: String,
}

impl RenderState {
    pub(crate) fn compute(state: &BatchState, spinner: char, elapsed: Duration) -> Self {
        // With nothing to run there is no meaningful ratio; show 0 rather than NaN.
        let percent = if state.total == 0 {
            0.0
        } else {
            state.current_index as f64 / state.total as f64 * 100.0
        };
        let elapsed_ms = elapsed.as_millis();
        let throughput = if elapsed_ms == 0 {
            0.0
        } else {
            state.beats as f64 * 1000.0 / elapsed_ms as f64
        };
        let mut coverage = String::new();
        state.coverage.write_summary(&mut coverage);

        Self {
            spinner,
            percent,
            current: state.current_index,
            total: state.total,
            throughput,
            coverage,
        }
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Testing... {} {:.0}% complete ({}/{}) {:.2} tests/sec {}",
            self.spinner,
            round_half_up(self.percent, 0),
            self.current,
            self.total,
            round_half_up(self.throughput, 2),
            self.coverage,
        )
    }
}

/// Writes the status line and owns the spinner animation.
#[derive(Debug)]
pub(crate) struct ProgressRenderer {
    target: RenderTarget,
    spin_frame: usize,
}

impl ProgressRenderer {
    pub(crate) fn new(target: RenderTarget) -> Self {
        Self {
            target,
            spin_frame: 0,
        }
    }

    pub(crate) fn target(&self) -> RenderTarget {
        self.target
    }

    /// Returns the state to display, advancing the spinner by one frame.
    pub(crate) fn next_state(&mut self, state: &BatchState, elapsed: Duration) -> RenderState {
        let spinner = SPINNER_FRAMES[self.spin_frame];
        self.spin_frame = (self.spin_frame + 1) % SPINNER_FRAMES.len();
        RenderState::compute(state, spinner, elapsed)
    }

    pub(crate) fn render(
        &mut self,
        state: &BatchState,
        elapsed: Duration,
        line: &mut dyn StatusLine,
    ) -> io::Result<()> {
        let text = self.next_state(state, elapsed).to_string();
        match self.target {
            RenderTarget::Interactive => {
                line.write("", Some(LineControl::ClearLine))?;
                line.write(&text, None)
            }
            RenderTarget::Streamed => line.write(&format!("{text}\n"), None),
        }
    }

    /// Ends the last render so that later output starts on a fresh line.
    ///
    /// Streamed renders already end with a newline.
    pub(crate) fn finish(&self, line: &mut dyn StatusLine) -> io::Result<()> {
        match self.target {
            RenderTarget::Interactive => line.write("\n", None),
            RenderTarget::Streamed => Ok(()),
        }
    }
}
