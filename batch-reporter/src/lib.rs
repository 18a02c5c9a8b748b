// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Live progress and summary reporting for test batches run across multiple remote agents.
//!
//! Agents stream events (results, errors, heartbeats) as they work through a shared batch of
//! test scripts. This crate aggregates them into batch-wide counters, draws a status line that
//! adapts to whether output is an interactive terminal, prints every failing test in a result
//! tree, and decides the exit status once the batch completes.

pub mod config;
pub mod errors;
pub mod exit_codes;
pub mod output;
pub mod reporter;
pub mod time;
