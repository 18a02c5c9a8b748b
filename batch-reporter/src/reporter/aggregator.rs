// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch-wide counters and the output produced as they change.
//!
//! The main structure in this module is [`ResultAggregator`], the single owner of [`BatchState`].

use super::{
    coverage::CoverageAccumulator,
    events::{AgentErrorDetails, AgentId, AgentResultDetails, ScriptErrorDetails},
    failures::FailureWalker,
    helpers::{Styles, ThemeCharacters},
    progress::{ProgressRenderer, RenderTarget},
};
use crate::{
    exit_codes::BatchExitCode,
    output::OutputSink,
    time::{Clock, Stopwatch},
};
use itertools::Itertools;
use owo_colors::OwoColorize;
use std::{io, time::Duration};

/// Counters for the whole batch.
#[derive(Clone, Debug, Default)]
pub(crate) struct BatchState {
    /// Tests in the batch times the number of agents. Seeded with the test count.
    pub(crate) total: usize,
    /// Results received so far.
    pub(crate) current_index: usize,
    pub(crate) passed: u64,
    pub(crate) failed: u64,
    /// Heartbeats received, used for throughput only.
    pub(crate) beats: u64,
    pub(crate) coverage: CoverageAccumulator,
}

/// What happened when the batch was dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DispatchOutcome {
    Started,
    NoAgents,
}

#[derive(Debug)]
pub(crate) struct ResultAggregator {
    state: BatchState,
    stopwatch: Stopwatch,
    renderer: ProgressRenderer,
    styles: Box<Styles>,
    theme: ThemeCharacters,
}

impl ResultAggregator {
    pub(crate) fn new(
        test_count: usize,
        clock: Box<dyn Clock>,
        target: RenderTarget,
        styles: Box<Styles>,
        theme: ThemeCharacters,
    ) -> Self {
        Self {
            state: BatchState {
                total: test_count,
                ..BatchState::default()
            },
            stopwatch: Stopwatch::start(clock),
            renderer: ProgressRenderer::new(target),
            styles,
            theme,
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> &BatchState {
        &self.state
    }

    pub(crate) fn render_target(&self) -> RenderTarget {
        self.renderer.target()
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.stopwatch.snapshot().duration
    }

    pub(crate) fn on_dispatch(
        &mut self,
        agents: &[AgentId],
        sink: &mut dyn OutputSink,
    ) -> io::Result<DispatchOutcome> {
        if agents.is_empty() {
            sink.panic(&format!(
                "{} No agents connected, exiting.",
                self.theme.fail.style(self.styles.fail)
            ))?;
            return Ok(DispatchOutcome::NoAgents);
        }

        sink.puts(&format!(
            "{} Testing started on {}",
            self.theme.pass.style(self.styles.pass),
            agents.iter().join(", ")
        ))?;
        self.state.total = self.state.total.saturating_mul(agents.len());
        Ok(DispatchOutcome::Started)
    }

    pub(crate) fn on_agent_result(
        &mut self,
        agent: &AgentId,
        details: &AgentResultDetails,
        sink: &mut dyn OutputSink,
    ) -> io::Result<()> {
        self.state.current_index = self.state.current_index.saturating_add(1);
        self.state.passed = self.state.passed.saturating_add(details.passed);
        self.state.failed = self.state.failed.saturating_add(details.failed);

        if let Some(coverage) = &details.coverage {
            self.state.coverage.merge(coverage);
            self.render(sink)?;
        }

        if details.failed > 0 {
            sink.puts(&format!(
                "{} {} on {agent}",
                self.theme.fail.style(self.styles.fail),
                details.name.style(self.styles.name),
            ))?;
            FailureWalker::new(&self.styles).walk(details, sink)?;
        }

        Ok(())
    }

    pub(crate) fn on_script_error(
        &mut self,
        agent: &AgentId,
        details: &ScriptErrorDetails,
        sink: &mut dyn OutputSink,
    ) -> io::Result<()> {
        let heading = format!("{} Script error", self.theme.fail);
        sink.puts(&format!(
            "{}: {}",
            heading.style(self.styles.fail),
            details.message
        ))?;
        sink.puts(&format!("  URL: {}", details.url))?;
        match &details.line {
            Some(line) => sink.puts(&format!("  Line: {line}"))?,
            None => sink.puts("  Line: unknown")?,
        }
        sink.puts(&format!("  User-Agent: {agent}"))
    }

    pub(crate) fn on_agent_error(
        &mut self,
        agent: &AgentId,
        details: &AgentErrorDetails,
        sink: &mut dyn OutputSink,
    ) -> io::Result<()> {
        let heading = format!("{} Error", self.theme.fail);
        sink.puts(&format!(
            "{}: {}",
            heading.style(self.styles.fail),
            details.message
        ))?;
        sink.puts(&format!("  User-Agent: {agent}"))
    }

    pub(crate) fn on_agent_complete(
        &mut self,
        agent: &AgentId,
        sink: &mut dyn OutputSink,
    ) -> io::Result<()> {
        sink.puts(&format!(
            "{} Agent completed: {agent}",
            self.theme.pass.style(self.styles.pass)
        ))
    }

    pub(crate) fn on_beat(&mut self, sink: &mut dyn OutputSink) -> io::Result<()> {
        self.state.beats = self.state.beats.saturating_add(1);
        self.render(sink)
    }

    /// Renders one last time and prints the summary. Returns the exit code to use.
    ///
    /// The final status line stays visible above the summary.
    pub(crate) fn on_complete(&mut self, sink: &mut dyn OutputSink) -> io::Result<i32> {
        self.render(sink)?;
        self.renderer.finish(sink.status_line())?;

        let elapsed_ms = self.stopwatch.snapshot().millis();
        let BatchState { passed, failed, .. } = self.state;
        let tested = passed.saturating_add(failed);

        if failed > 0 {
            sink.puts(&format!(
                "{}: {failed} of {tested} tests failed. ({elapsed_ms}ms)",
                "Failures".style(self.styles.fail)
            ))?;
            Ok(BatchExitCode::TESTS_FAILED)
        } else {
            let summary = format!("{tested} tests passed!");
            sink.puts(&format!(
                "{} ({elapsed_ms}ms)",
                summary.style(self.styles.pass)
            ))?;
            Ok(BatchExitCode::OK)
        }
    }

    fn render(&mut self, sink: &mut dyn OutputSink) -> io::Result<()> {
        let elapsed = self.elapsed();
        self.renderer
            .render(&self.state, elapsed, sink.status_line())
    }
}
