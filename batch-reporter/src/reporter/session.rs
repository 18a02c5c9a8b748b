// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The public event surface of a batch session.
//!
//! The main structure in this module is [`SessionController`], which is constructed via a
//! [`SessionBuilder`].

use super::{
    aggregator::{DispatchOutcome, ResultAggregator},
    events::{
        AgentErrorDetails, AgentId, AgentResultDetails, BatchDescriptor, ReporterEvent,
        ScriptErrorDetails,
    },
    helpers::{Styles, ThemeCharacters},
    progress::RenderTarget,
};
use crate::{
    config::{ReporterConfig, StatusLineMode, UnicodeMode},
    errors::WriteEventError,
    exit_codes::BatchExitCode,
    output::OutputSink,
    time::{Clock, SystemClock},
};
use std::time::Duration;
use tracing::{debug, warn};

/// Receives the events of one batch run.
///
/// `on_dispatch` is expected once before any per-agent event, and `on_complete` once after all
/// agent activity has ended.
pub trait ResultReporter {
    /// The batch was dispatched to `agents`. An empty list aborts the session.
    fn on_dispatch(&mut self, agents: &[AgentId]) -> Result<(), WriteEventError>;

    /// `agent` finished one test script.
    fn on_agent_result(
        &mut self,
        agent: &AgentId,
        details: &AgentResultDetails,
    ) -> Result<(), WriteEventError>;

    /// `agent` hit an uncaught script error.
    fn on_agent_script_error(
        &mut self,
        agent: &AgentId,
        details: &ScriptErrorDetails,
    ) -> Result<(), WriteEventError>;

    /// `agent` reported an agent-level error.
    fn on_agent_error(
        &mut self,
        agent: &AgentId,
        details: &AgentErrorDetails,
    ) -> Result<(), WriteEventError>;

    /// `agent` finished its share of the batch.
    fn on_agent_complete(&mut self, agent: &AgentId) -> Result<(), WriteEventError>;

    /// A heartbeat from `agent`.
    fn on_beat(&mut self, agent: &AgentId) -> Result<(), WriteEventError>;

    /// Every agent has finished.
    fn on_complete(&mut self) -> Result<(), WriteEventError>;

    /// Routes `event` to the matching handler.
    fn report_event(&mut self, event: &ReporterEvent) -> Result<(), WriteEventError> {
        match event {
            ReporterEvent::Dispatch { agents } => self.on_dispatch(agents),
            ReporterEvent::AgentResult { agent, details } => self.on_agent_result(agent, details),
            ReporterEvent::AgentScriptError { agent, details } => {
                self.on_agent_script_error(agent, details)
            }
            ReporterEvent::AgentError { agent, details } => self.on_agent_error(agent, details),
            ReporterEvent::AgentComplete { agent } => self.on_agent_complete(agent),
            ReporterEvent::AgentBeat { agent } => self.on_beat(agent),
            ReporterEvent::Complete => self.on_complete(),
        }
    }
}

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the batch to be dispatched.
    Idle,

    /// Dispatched, but no agent has reported yet.
    Dispatched,

    /// At least one agent event has been received.
    Running,

    /// The batch finished and an exit code was decided.
    Completed,

    /// No agents were connected at dispatch time.
    Aborted,
}

impl SessionState {
    /// Returns true if no further events will be processed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// A point-in-time copy of the batch counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchSummary {
    /// Tests in the batch times the number of agents.
    pub total: usize,

    /// Results received so far.
    pub completed: usize,

    /// Passed tests reported so far.
    pub passed: u64,

    /// Failed tests reported so far.
    pub failed: u64,

    /// Heartbeats received so far.
    pub beats: u64,

    /// Coverage samples merged so far.
    pub coverage_samples: usize,

    /// Running line totals, as `(called, covered)`.
    pub coverage_lines: (u64, u64),

    /// Time since the session was created.
    pub elapsed: Duration,
}

/// Builder for a [`SessionController`].
#[derive(Debug, Default)]
pub struct SessionBuilder {
    should_colorize: bool,
    status_line: StatusLineMode,
    unicode: UnicodeMode,
    clock: Option<Box<dyn Clock>>,
}

impl SessionBuilder {
    /// Set to true if the session should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets how the status line is drawn.
    pub fn set_status_line_mode(&mut self, status_line: StatusLineMode) -> &mut Self {
        self.status_line = status_line;
        self
    }

    /// Sets whether Unicode glyphs are used.
    pub fn set_unicode_mode(&mut self, unicode: UnicodeMode) -> &mut Self {
        self.unicode = unicode;
        self
    }

    /// Sets the time source. Defaults to [`SystemClock`].
    pub fn set_clock(&mut self, clock: impl Clock + 'static) -> &mut Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Applies the UI settings from `config`.
    pub fn apply_config(&mut self, config: &ReporterConfig) -> &mut Self {
        self.set_status_line_mode(config.ui.status_line)
            .set_unicode_mode(config.ui.unicode)
    }

    /// Creates a session for `batch` that writes to `sink`.
    ///
    /// The test count is read from `batch` once, here.
    pub fn build<S: OutputSink>(
        self,
        batch: &(impl BatchDescriptor + ?Sized),
        mut sink: S,
    ) -> SessionController<S> {
        let target = match self.status_line {
            StatusLineMode::Auto => RenderTarget::detect(sink.status_line()),
            StatusLineMode::Rewrite => RenderTarget::Interactive,
            StatusLineMode::Append => RenderTarget::Streamed,
        };

        let mut styles = Box::<Styles>::default();
        if self.should_colorize {
            styles.colorize();
        }

        let mut theme = ThemeCharacters::default();
        let use_unicode = match self.unicode {
            UnicodeMode::Auto => sink.supports_unicode(),
            UnicodeMode::Always => true,
            UnicodeMode::Never => false,
        };
        if use_unicode {
            theme.use_unicode();
        }

        let test_count = batch.test_count();
        debug!(
            test_count,
            ?target,
            use_unicode,
            colorize = self.should_colorize,
            "session created"
        );

        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));
        SessionController {
            aggregator: ResultAggregator::new(test_count, clock, target, styles, theme),
            sink,
            state: SessionState::Idle,
            exit_code: None,
        }
    }
}

/// Drives one batch session: routes events to the aggregator and decides the exit status.
#[derive(Debug)]
pub struct SessionController<S> {
    aggregator: ResultAggregator,
    sink: S,
    state: SessionState,
    exit_code: Option<i32>,
}

impl<S: OutputSink> SessionController<S> {
    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the decided exit status, or `None` until the session has completed or aborted.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Returns the render target chosen at construction.
    pub fn render_target(&self) -> RenderTarget {
        self.aggregator.render_target()
    }

    /// Returns a copy of the batch counters.
    pub fn summary(&self) -> BatchSummary {
        let state = self.aggregator.state();
        BatchSummary {
            total: state.total,
            completed: state.current_index,
            passed: state.passed,
            failed: state.failed,
            beats: state.beats,
            coverage_samples: state.coverage.samples_merged(),
            coverage_lines: (state.coverage.called_lines(), state.coverage.covered_lines()),
            elapsed: self.aggregator.elapsed(),
        }
    }

    /// Returns the output sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the session, returning the output sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!("session state: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    /// Checks whether a per-agent event should be processed, moving `Dispatched` to `Running`.
    fn accept_agent_event(&mut self, event: &str, agent: &AgentId) -> bool {
        if self.state.is_terminal() {
            warn!(
                "ignoring {event} from {agent}: session is {:?}",
                self.state
            );
            return false;
        }

        match self.state {
            SessionState::Idle => warn!("{event} from {agent} received before dispatch"),
            SessionState::Dispatched => self.set_state(SessionState::Running),
            _ => {}
        }
        true
    }
}

impl<S: OutputSink> ResultReporter for SessionController<S> {
    fn on_dispatch(&mut self, agents: &[AgentId]) -> Result<(), WriteEventError> {
        if self.state != SessionState::Idle {
            warn!("ignoring dispatch: session is {:?}", self.state);
            return Ok(());
        }

        match self.aggregator.on_dispatch(agents, &mut self.sink)? {
            DispatchOutcome::Started => self.set_state(SessionState::Dispatched),
            DispatchOutcome::NoAgents => {
                self.exit_code = Some(BatchExitCode::NO_AGENTS);
                self.set_state(SessionState::Aborted);
            }
        }
        Ok(())
    }

    fn on_agent_result(
        &mut self,
        agent: &AgentId,
        details: &AgentResultDetails,
    ) -> Result<(), WriteEventError> {
        if self.accept_agent_event("result", agent) {
            self.aggregator
                .on_agent_result(agent, details, &mut self.sink)?;
        }
        Ok(())
    }

    fn on_agent_script_error(
        &mut self,
        agent: &AgentId,
        details: &ScriptErrorDetails,
    ) -> Result<(), WriteEventError> {
        if self.accept_agent_event("script error", agent) {
            self.aggregator
                .on_script_error(agent, details, &mut self.sink)?;
        }
        Ok(())
    }

    fn on_agent_error(
        &mut self,
        agent: &AgentId,
        details: &AgentErrorDetails,
    ) -> Result<(), WriteEventError> {
        if self.accept_agent_event("agent error", agent) {
            self.aggregator
                .on_agent_error(agent, details, &mut self.sink)?;
        }
        Ok(())
    }

    fn on_agent_complete(&mut self, agent: &AgentId) -> Result<(), WriteEventError> {
        if self.accept_agent_event("agent completion", agent) {
            self.aggregator.on_agent_complete(agent, &mut self.sink)?;
        }
        Ok(())
    }

    fn on_beat(&mut self, agent: &AgentId) -> Result<(), WriteEventError> {
        if self.accept_agent_event("heartbeat", agent) {
            self.aggregator.on_beat(&mut self.sink)?;
        }
        Ok(())
    }

    fn on_complete(&mut self) -> Result<(), WriteEventError> {
        if self.state.is_terminal() {
            warn!("ignoring completion: session is {:?}", self.state);
            return Ok(());
        }
        if self.state == SessionState::Idle {
            warn!("completion received before dispatch");
        }

        let code = self.aggregator.on_complete(&mut self.sink)?;
        self.exit_code = Some(code);
        self.set_state(SessionState::Completed);
        self.sink.exit(code)?;
        Ok(())
    }
}
