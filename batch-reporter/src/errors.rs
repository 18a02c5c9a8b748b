// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the batch reporter.

use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// An error that occurred while writing an event to the output sink.
///
/// Test failures, agent errors and script errors are never reported through this type: they are
/// part of the normal output. This only covers the output itself going wrong.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing to the output sink.
    #[error("error writing to output")]
    Io(#[source] io::Error),
}

impl From<io::Error> for WriteEventError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// An error that occurred while parsing a line of the event stream.
#[derive(Debug, Error)]
#[error("failed to parse event on line {line_number}")]
pub struct EventParseError {
    line_number: usize,
    #[source]
    kind: EventParseErrorKind,
}

impl EventParseError {
    pub(crate) fn new(line_number: usize, kind: EventParseErrorKind) -> Self {
        Self { line_number, kind }
    }

    /// Returns the 1-based line number the error occurred on.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns the kind of error that occurred.
    pub fn kind(&self) -> &EventParseErrorKind {
        &self.kind
    }
}

/// The reason an event could not be parsed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EventParseErrorKind {
    /// The line was not a valid event.
    #[error("invalid event JSON")]
    Json(#[source] serde_json::Error),

    /// A test leaf in a result tree had a malformed field.
    #[error("invalid test leaf at `{path}`: field `{field}` {reason}")]
    InvalidLeaf {
        /// Path to the leaf within the result tree, joined with `/`.
        path: String,

        /// The offending field.
        field: &'static str,

        /// What was wrong with it.
        reason: &'static str,
    },

    /// Reading the underlying stream failed.
    #[error("error reading event stream")]
    Read(#[source] io::Error),
}

/// An error that occurred while loading reporter configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file at `{path}`")]
    Read {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// The config file could not be parsed.
    #[error("failed to parse config file at `{path}`")]
    Parse {
        /// The path that was parsed.
        path: Utf8PathBuf,

        /// The underlying TOML error.
        #[source]
        error: toml::de::Error,
    },
}
