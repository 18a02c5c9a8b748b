// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::NO_HEADING_TARGET;
use batch_reporter::{
    errors::{ConfigError, EventParseError, WriteEventError},
    exit_codes::BatchExitCode,
    reporter::SessionState,
};
use camino::Utf8PathBuf;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholder messages: errors are meant to be printed with
// display_to_stderr, which also walks the source chain.

/// An error that ends the program with a documented exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config load error")]
    ConfigLoad {
        #[from]
        err: ConfigError,
    },
    #[error("failed to open event stream")]
    EventsOpen {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("event stream error")]
    EventStream {
        #[from]
        err: EventParseError,
    },
    #[error("event stream ended before the batch completed")]
    StreamIncomplete { state: SessionState },
    #[error("error writing to output")]
    WriteEvent {
        #[from]
        err: WriteEventError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigLoad { .. } | Self::EventsOpen { .. } => BatchExitCode::SETUP_ERROR,
            Self::EventStream { .. } | Self::StreamIncomplete { .. } => {
                BatchExitCode::EVENT_STREAM_ERROR
            }
            Self::WriteEvent { .. } => BatchExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self) {
        let mut next_error = match self {
            Self::ConfigLoad { err } => {
                error!("failed to load configuration");
                Some(err as &dyn Error)
            }
            Self::EventsOpen { path, err } => {
                error!("failed to open event stream at `{path}`");
                Some(err as &dyn Error)
            }
            Self::EventStream { err } => {
                error!("{err}");
                err.source()
            }
            Self::StreamIncomplete { state } => {
                error!("event stream ended before the batch completed (session state: {state:?})");
                None
            }
            Self::WriteEvent { err } => {
                error!("failed to write batch report");
                err.source()
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
