// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use batch_reporter::{
    config::UnicodeMode,
    output::BufferOutput,
    reporter::{BatchDescriptor, EventReader, ResultReporter, SessionBuilder, SessionController},
    time::ManualClock,
};
use color_eyre::eyre::Result;
use indoc::indoc;
use std::{io::Cursor, time::Duration};

/// Two agents, one script. Chrome reports a nested failure with coverage, Firefox passes and then
/// hits a script error.
pub(crate) static TWO_AGENT_STREAM: &str = indoc! {r#"
    {"event":"dispatch","agents":["Chrome","Firefox"]}
    {"event":"agent-beat","agent":"Chrome"}
    {"event":"agent-result","agent":"Chrome","details":{"name":"ui.html","passed":1,"failed":1,"coverage":{"ui.js":{"calledLines":3,"coveredLines":4}},"ui":{"name":"ui","login":{"passed":0,"failed":1,"type":"test","result":"fail","message":"expected true\ngot false"},"signup":{"passed":1,"failed":0,"type":"test","result":"pass"}}}}

    {"event":"agent-result","agent":"Firefox","details":{"name":"ui.html","passed":2,"failed":0}}
    {"event":"agent-script-error","agent":"Firefox","details":{"message":"x is undefined","url":"http://localhost/ui.js","line":7}}
    {"event":"agent-complete","agent":"Chrome"}
    {"event":"agent-complete","agent":"Firefox"}
    {"event":"complete"}
"#};

/// Time that passes before each replayed event.
pub(crate) const EVENT_SPACING: Duration = Duration::from_millis(250);

pub(crate) fn new_session(
    batch: &(impl BatchDescriptor + ?Sized),
    is_terminal: bool,
    clock: &ManualClock,
) -> SessionController<BufferOutput> {
    let mut builder = SessionBuilder::default();
    builder
        .set_unicode_mode(UnicodeMode::Always)
        .set_clock(clock.clone());
    builder.build(batch, BufferOutput::new(is_terminal))
}

/// Replays a JSON-lines stream into `session`, advancing `clock` before every event.
pub(crate) fn replay(
    session: &mut SessionController<BufferOutput>,
    clock: &ManualClock,
    stream: &str,
) -> Result<()> {
    for event in EventReader::new(Cursor::new(stream)) {
        let event = event?;
        clock.advance(EVENT_SPACING);
        session.report_event(&event)?;
    }
    Ok(())
}
