// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use batch_reporter::{
    exit_codes::BatchExitCode,
    output::{LineControl, StatusWrite},
    reporter::{EventReader, RenderTarget, SessionState},
    time::ManualClock,
};
use color_eyre::eyre::Result;
use pretty_assertions::assert_eq;
use std::io::Cursor;

const EXPECTED_LINES: [&str; 13] = [
    "✓ Testing started on Chrome, Firefox",
    "✗ ui.html on Chrome",
    "   in ui",
    "     login: expected true",
    "       got false",
    "",
    "✗ Script error: x is undefined",
    "  URL: http://localhost/ui.js",
    "  Line: 7",
    "  User-Agent: Firefox",
    "✓ Agent completed: Chrome",
    "✓ Agent completed: Firefox",
    "Failures: 1 of 4 tests failed. (2000ms)",
];

const EXPECTED_STATUS: [&str; 3] = [
    "Testing... / 0% complete (0/2) 2.00 tests/sec ",
    "Testing... | 50% complete (1/2) 1.33 tests/sec 75% line coverage ",
    "Testing... \\ 100% complete (2/2) 0.50 tests/sec 75% line coverage ",
];

#[test]
fn replay_streamed() -> Result<()> {
    let clock = ManualClock::new();
    let mut session = new_session(&["ui.html"], false, &clock);
    assert_eq!(session.render_target(), RenderTarget::Streamed);

    replay(&mut session, &clock, TWO_AGENT_STREAM)?;

    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(session.exit_code(), Some(BatchExitCode::TESTS_FAILED));

    let summary = session.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 2);
    assert_eq!((summary.passed, summary.failed), (3, 1));
    assert_eq!(summary.coverage_samples, 1);
    assert_eq!(summary.coverage_lines, (3, 4));

    let out = session.into_sink();
    assert_eq!(out.lines(), EXPECTED_LINES);
    assert_eq!(out.exit_code(), Some(BatchExitCode::TESTS_FAILED));

    let expected_writes: Vec<_> = EXPECTED_STATUS
        .iter()
        .map(|text| StatusWrite {
            text: format!("{text}\n"),
            control: None,
        })
        .collect();
    assert_eq!(out.status_writes(), expected_writes);

    Ok(())
}

#[test]
fn replay_interactive() -> Result<()> {
    let clock = ManualClock::new();
    let mut session = new_session(&["ui.html"], true, &clock);
    assert_eq!(session.render_target(), RenderTarget::Interactive);

    replay(&mut session, &clock, TWO_AGENT_STREAM)?;
    let out = session.into_sink();

    // Full lines are identical regardless of the render target.
    assert_eq!(out.lines(), EXPECTED_LINES);

    let mut expected_writes: Vec<_> = EXPECTED_STATUS
        .iter()
        .flat_map(|text| {
            [
                StatusWrite {
                    text: String::new(),
                    control: Some(LineControl::ClearLine),
                },
                StatusWrite {
                    text: (*text).to_owned(),
                    control: None,
                },
            ]
        })
        .collect();
    // The final render is ended so the summary prints below it.
    expected_writes.push(StatusWrite {
        text: "\n".to_owned(),
        control: None,
    });
    assert_eq!(out.status_writes(), expected_writes);

    Ok(())
}

#[test]
fn stream_without_agents_aborts() -> Result<()> {
    let clock = ManualClock::new();
    let mut session = new_session(&["a.html", "b.html"], false, &clock);

    replay(
        &mut session,
        &clock,
        concat!(
            r#"{"event":"dispatch","agents":[]}"#,
            "\n",
            r#"{"event":"agent-result","agent":"Chrome","details":{"name":"a.html","passed":1,"failed":0}}"#,
            "\n",
            r#"{"event":"complete"}"#,
            "\n",
        ),
    )?;

    assert_eq!(session.state(), SessionState::Aborted);
    assert_eq!(session.exit_code(), Some(BatchExitCode::NO_AGENTS));
    assert_eq!(session.summary().completed, 0);

    let out = session.into_sink();
    assert_eq!(out.lines(), ["✗ No agents connected, exiting."]);
    assert_eq!(out.exit_code(), None);

    Ok(())
}

#[test]
fn parse_errors_report_line_numbers() {
    let stream = concat!(
        r#"{"event":"dispatch","agents":["A"]}"#,
        "\n\n",
        r#"{"event":"agent-beat"}"#,
        "\n",
    );

    let results: Vec<_> = EventReader::new(Cursor::new(stream)).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    let err = results[1].as_ref().expect_err("agent is missing");
    assert_eq!(err.line_number(), 3);
    assert_eq!(err.to_string(), "failed to parse event on line 3");
}
