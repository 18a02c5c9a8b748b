// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for batch runs.
///
/// A batch can end in a handful of expected ways. This structure documents the exit codes for
/// each of them.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum BatchExitCode {}

impl BatchExitCode {
    /// Every test in the batch passed.
    pub const OK: i32 = 0;

    /// One or more tests failed.
    pub const TESTS_FAILED: i32 = 1;

    /// No agents were connected when the batch was dispatched.
    pub const NO_AGENTS: i32 = 1;

    /// A user issue happened while setting up the reporter (arguments or configuration).
    pub const SETUP_ERROR: i32 = 96;

    /// The event stream could not be parsed, or ended before the batch completed.
    pub const EVENT_STREAM_ERROR: i32 = 97;

    /// Writing data to the output sink produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
