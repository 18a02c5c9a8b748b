// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ExpectedError, Result},
    output::{OutputContext, OutputOpts, clap_styles},
};
use batch_reporter::{
    config::ReporterConfig,
    output::{OutputSink, TerminalOutput},
    reporter::{EventReader, ResultReporter, SessionBuilder, SessionController},
};
use camino::Utf8PathBuf;
use clap::Parser;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
};
use tracing::debug;

/// Replay agent events into a live batch progress report.
///
/// Events are read as JSON lines, one per line, from `--events` or standard input. The process
/// exits with the status decided once the batch completes.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style())]
pub struct BatchFeedbackApp {
    /// Path to a reporter config file
    #[arg(long, value_name = "PATH")]
    config: Option<Utf8PathBuf>,

    /// Path to a JSON-lines event stream [default: standard input]
    #[arg(long, value_name = "PATH")]
    events: Option<Utf8PathBuf>,

    #[command(flatten)]
    output: OutputOpts,

    /// Test scripts in the batch
    #[arg(value_name = "TEST")]
    tests: Vec<String>,
}

impl BatchFeedbackApp {
    /// Initializes color handling and logging.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the exit code to use.
    ///
    /// With a terminal sink, completion and abort end the process from inside the session, so
    /// this only returns on error or when the sink does not exit.
    pub fn exec(self, output: OutputContext) -> Result<i32> {
        let config = ReporterConfig::load(self.config.as_deref())?;

        let mut builder = SessionBuilder::default();
        builder
            .set_colorize(output.should_colorize_stderr())
            .apply_config(&config);
        let session = builder.build(&self.tests, TerminalOutput::new());

        match &self.events {
            Some(path) => {
                let file = File::open(path).map_err(|err| ExpectedError::EventsOpen {
                    path: path.clone(),
                    err,
                })?;
                replay(session, BufReader::new(file))
            }
            None => replay(session, io::stdin().lock()),
        }
    }
}

/// Feeds every event in `reader` to `session`, stopping once the session has an exit code.
pub(crate) fn replay<S: OutputSink>(
    mut session: SessionController<S>,
    reader: impl BufRead,
) -> Result<i32> {
    for event in EventReader::new(reader) {
        let event = event?;
        debug!(?event, "replaying event");
        session.report_event(&event)?;
        if let Some(code) = session.exit_code() {
            return Ok(code);
        }
    }

    Err(ExpectedError::StreamIncomplete {
        state: session.state(),
    })
}
