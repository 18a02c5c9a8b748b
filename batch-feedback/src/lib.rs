// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replays a JSON-lines stream of agent events into a live batch progress report.
//!
//! Each line of the stream is one event (`dispatch`, `agent-result`, `agent-beat`, ...). The
//! process exits with the status decided by the session: 0 if every test passed, 1 if any test
//! failed or no agents were connected.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputContext;
