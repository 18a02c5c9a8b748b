// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate the results of a batch run across agents and report them to the terminal.
//!
//! The main type here is [`SessionController`], which is constructed via a [`SessionBuilder`].
//! Events reach it either directly through the [`ResultReporter`] handlers, or from a JSON-lines
//! stream via [`EventReader`].

mod aggregator;
mod coverage;
mod events;
mod failures;
mod helpers;
mod progress;
mod session;
mod wire;

pub use events::*;
pub use progress::RenderTarget;
pub use session::*;
pub use wire::*;
