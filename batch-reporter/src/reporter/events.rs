// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events and data reported by agents.
//!
//! These types are the typed form of what agents send. The untyped JSON form is converted into
//! them in the `wire` module.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::fmt;

/// The marker a test leaf's `result` field carries when the test failed.
pub const FAILURE_MARKER: &str = "fail";

/// Identifies a remote agent, typically by its user agent string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a new agent identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Describes the batch of test scripts being run.
pub trait BatchDescriptor {
    /// Returns the number of test scripts in the batch.
    fn test_count(&self) -> usize;
}

impl<T> BatchDescriptor for [T] {
    fn test_count(&self) -> usize {
        self.len()
    }
}

impl<T, const N: usize> BatchDescriptor for [T; N] {
    fn test_count(&self) -> usize {
        N
    }
}

impl<T> BatchDescriptor for Vec<T> {
    fn test_count(&self) -> usize {
        self.len()
    }
}

/// Line counts for a single file within a [`CoverageSample`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    /// Lines reported as called.
    pub called_lines: u64,

    /// Lines reported as covered.
    pub covered_lines: u64,
}

/// Per-file line coverage contributed by one agent for one test.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CoverageSample {
    files: IndexMap<String, FileCoverage>,
}

impl CoverageSample {
    /// Creates a sample from `(path, coverage)` pairs.
    pub fn new(files: impl IntoIterator<Item = (String, FileCoverage)>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }

    /// Iterates over the files in this sample.
    pub fn files(&self) -> impl Iterator<Item = (&str, &FileCoverage)> + '_ {
        self.files.iter().map(|(path, cov)| (path.as_str(), cov))
    }
}

/// The result of one test script on one agent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentResultDetails {
    /// The name of the test script.
    pub name: String,

    /// The number of tests that passed.
    pub passed: u64,

    /// The number of tests that failed.
    pub failed: u64,

    /// Coverage collected while running the script, if any.
    pub coverage: Option<CoverageSample>,

    /// The suites and tests the script produced, in reported order.
    pub children: IndexMap<String, ResultNode>,
}

/// A node in a result tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultNode {
    /// A named grouping of further nodes.
    Suite(Suite),

    /// A single test outcome.
    TestLeaf(TestLeaf),
}

/// A named group of result nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Suite {
    /// The name of the suite.
    pub name: String,

    /// The child nodes, in reported order.
    pub children: IndexMap<String, ResultNode>,
}

/// A single test outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestLeaf {
    /// The test name.
    pub name: String,

    /// Passed assertion count.
    pub passed: u64,

    /// Failed assertion count.
    pub failed: u64,

    /// The result marker, e.g. `"pass"` or `"fail"`.
    pub result: Option<String>,

    /// The failure message. May span multiple lines.
    pub message: String,
}

impl TestLeaf {
    /// Returns true if this leaf represents a failed test.
    ///
    /// A leaf carrying a result marker fails iff the marker is [`FAILURE_MARKER`]. A leaf without
    /// one fails iff its failed count is nonzero.
    pub fn is_failure(&self) -> bool {
        match &self.result {
            Some(result) => result == FAILURE_MARKER,
            None => self.failed > 0,
        }
    }
}

/// An uncaught script error reported by an agent.
///
/// Agents fill these fields in on a best-effort basis, so every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ScriptErrorDetails {
    /// The error message.
    #[serde(default)]
    pub message: String,

    /// The URL of the script the error occurred in.
    #[serde(default)]
    pub url: String,

    /// The line the error occurred on, as reported. `None` if absent or null.
    #[serde(default)]
    pub line: Option<ErrorLine>,
}

/// A line location as reported by an agent.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorLine {
    /// A numeric line.
    Number(Number),

    /// A line reported as a string.
    Text(String),

    /// Any other JSON value.
    Other(Value),
}

impl fmt::Display for ErrorLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// An agent-level error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AgentErrorDetails {
    /// The error message.
    #[serde(default)]
    pub message: String,
}

/// An event delivered to a [`ResultReporter`](super::ResultReporter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReporterEvent {
    /// The batch was dispatched to the given agents.
    Dispatch {
        /// The connected agents.
        agents: Vec<AgentId>,
    },

    /// An agent finished one test script.
    AgentResult {
        /// The reporting agent.
        agent: AgentId,
        /// The result.
        details: AgentResultDetails,
    },

    /// An agent hit an uncaught script error.
    AgentScriptError {
        /// The reporting agent.
        agent: AgentId,
        /// The error.
        details: ScriptErrorDetails,
    },

    /// An agent reported an error.
    AgentError {
        /// The reporting agent.
        agent: AgentId,
        /// The error.
        details: AgentErrorDetails,
    },

    /// An agent finished its share of the batch.
    AgentComplete {
        /// The agent.
        agent: AgentId,
    },

    /// A heartbeat from an agent.
    AgentBeat {
        /// The agent.
        agent: AgentId,
    },

    /// Every agent has finished.
    Complete,
}
