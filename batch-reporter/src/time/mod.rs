// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

mod clock;
mod stopwatch;

pub use clock::*;
pub(crate) use stopwatch::*;
