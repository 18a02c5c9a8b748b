// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::new_session;
use batch_reporter::{
    exit_codes::BatchExitCode,
    reporter::{AgentId, AgentResultDetails, ResultReporter},
    time::ManualClock,
};
use proptest::prelude::*;
use test_strategy::proptest;

fn agents(count: usize) -> Vec<AgentId> {
    (0..count).map(|i| AgentId::new(format!("agent-{i}"))).collect()
}

fn result(passed: u64, failed: u64) -> AgentResultDetails {
    AgentResultDetails {
        name: "script.html".to_owned(),
        passed,
        failed,
        ..AgentResultDetails::default()
    }
}

#[proptest]
fn dispatch_sets_total(
    #[strategy(0usize..64)] tests: usize,
    #[strategy(1usize..16)] agents_len: usize,
) {
    let clock = ManualClock::new();
    let batch = vec!["script.html"; tests];
    let mut session = new_session(&batch, false, &clock);

    session.on_dispatch(&agents(agents_len)).unwrap();

    prop_assert_eq!(session.summary().total, tests * agents_len);
}

#[proptest]
fn abort_freezes_counters(
    #[strategy(0usize..16)] tests: usize,
    #[strategy(prop::collection::vec((0u64..5, 0u64..5), 0..20))] results: Vec<(u64, u64)>,
) {
    let clock = ManualClock::new();
    let batch = vec!["script.html"; tests];
    let mut session = new_session(&batch, false, &clock);
    session.on_dispatch(&[]).unwrap();
    let before = session.summary();

    let agent = AgentId::new("ghost");
    for (passed, failed) in results {
        session.on_agent_result(&agent, &result(passed, failed)).unwrap();
        session.on_beat(&agent).unwrap();
    }
    session.on_complete().unwrap();

    let after = session.summary();
    prop_assert_eq!(
        (after.total, after.completed, after.passed, after.failed, after.beats),
        (before.total, before.completed, before.passed, before.failed, before.beats)
    );
    prop_assert_eq!(session.exit_code(), Some(BatchExitCode::NO_AGENTS));
}

#[proptest]
fn exit_code_reflects_failures(
    #[strategy(prop::collection::vec((0u64..5, 0u64..3), 0..20))] results: Vec<(u64, u64)>,
) {
    let clock = ManualClock::new();
    let mut session = new_session(&["script.html"], false, &clock);
    session.on_dispatch(&agents(1)).unwrap();

    let agent = AgentId::new("agent-0");
    let mut failed_total = 0;
    for &(passed, failed) in &results {
        failed_total += failed;
        session.on_agent_result(&agent, &result(passed, failed)).unwrap();
    }
    session.on_complete().unwrap();

    let expected = if failed_total == 0 {
        BatchExitCode::OK
    } else {
        BatchExitCode::TESTS_FAILED
    };
    prop_assert_eq!(session.exit_code(), Some(expected));
    prop_assert_eq!(session.sink().exit_code(), Some(expected));
    prop_assert_eq!(session.summary().completed, results.len());
}
