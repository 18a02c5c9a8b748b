// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output sinks the reporter writes to.
//!
//! The reporter never touches stdout or stderr directly. Everything goes through an
//! [`OutputSink`], which is either the real terminal ([`TerminalOutput`]) or an in-memory buffer
//! ([`BufferOutput`]) for tests.

use crate::exit_codes::BatchExitCode;
use crossterm::{
    cursor::MoveToColumn,
    queue,
    terminal::{Clear, ClearType},
};
use std::io::{self, IsTerminal, Write};
use tracing::debug;

/// A control request sent alongside a status-line write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineControl {
    /// Erase the current line and return the cursor to its start.
    ClearLine,
}

/// A handle to a single rewritable line of output.
pub trait StatusLine {
    /// Writes `text` to the line, first applying `control` if one is given.
    ///
    /// No newline is added.
    fn write(&mut self, text: &str, control: Option<LineControl>) -> io::Result<()>;

    /// Returns true if the underlying destination is an interactive terminal.
    fn is_terminal(&self) -> bool;
}

/// Destination for everything the reporter prints.
pub trait OutputSink {
    /// Prints a full line of text, followed by a newline.
    fn puts(&mut self, line: &str) -> io::Result<()>;

    /// Prints `message` and terminates the session.
    ///
    /// For the terminal this ends the process with [`BatchExitCode::NO_AGENTS`].
    fn panic(&mut self, message: &str) -> io::Result<()>;

    /// Ends the session with the given process exit status.
    fn exit(&mut self, code: i32) -> io::Result<()>;

    /// Returns the rewritable status line.
    fn status_line(&mut self) -> &mut dyn StatusLine;

    /// Returns true if the destination can display Unicode glyphs.
    fn supports_unicode(&self) -> bool {
        true
    }
}

/// An [`OutputSink`] that writes to standard error.
#[derive(Debug)]
pub struct TerminalOutput<W = io::Stderr> {
    status_line: TerminalStatusLine<W>,
}

impl TerminalOutput {
    /// Creates a new terminal sink, detecting whether stderr is interactive.
    pub fn new() -> Self {
        // Some CI environments appear to pretend to be a terminal. Treat them as piped.
        let is_terminal = io::stderr().is_terminal() && !is_ci::uncached();
        debug!("terminal output: stderr is_terminal = {is_terminal}");
        Self::with_writer(io::stderr(), is_terminal)
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalOutput<W> {
    pub(crate) fn with_writer(out: W, is_terminal: bool) -> Self {
        Self {
            status_line: TerminalStatusLine {
                out,
                is_terminal,
                showing: false,
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn writer(&self) -> &W {
        &self.status_line.out
    }
}

impl<W: Write> OutputSink for TerminalOutput<W> {
    fn puts(&mut self, line: &str) -> io::Result<()> {
        let out = &mut self.status_line.out;
        // Don't let a full line land on the tail of a half-drawn status line.
        if self.status_line.showing {
            queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            self.status_line.showing = false;
        }
        writeln!(out, "{line}")?;
        out.flush()
    }

    fn panic(&mut self, message: &str) -> io::Result<()> {
        self.puts(message)?;
        std::process::exit(BatchExitCode::NO_AGENTS)
    }

    fn exit(&mut self, code: i32) -> io::Result<()> {
        self.status_line.end_line()?;
        std::process::exit(code)
    }

    fn status_line(&mut self) -> &mut dyn StatusLine {
        &mut self.status_line
    }

    fn supports_unicode(&self) -> bool {
        supports_unicode::on(supports_unicode::Stream::Stderr)
    }
}

#[derive(Debug)]
struct TerminalStatusLine<W> {
    out: W,
    is_terminal: bool,
    // True if the cursor is sitting at the end of an unterminated status line.
    showing: bool,
}

impl<W: Write> TerminalStatusLine<W> {
    /// Moves past a status line that is still showing, leaving it in place.
    fn end_line(&mut self) -> io::Result<()> {
        if self.showing {
            writeln!(self.out)?;
            self.showing = false;
        }
        self.out.flush()
    }
}

impl<W: Write> StatusLine for TerminalStatusLine<W> {
    fn write(&mut self, text: &str, control: Option<LineControl>) -> io::Result<()> {
        match control {
            Some(LineControl::ClearLine) => {
                queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
                self.showing = false;
            }
            None => {}
        }
        if !text.is_empty() {
            self.out.write_all(text.as_bytes())?;
            self.showing = !text.ends_with('\n');
        }
        self.out.flush()
    }

    fn is_terminal(&self) -> bool {
        self.is_terminal
    }
}

/// A single write made to a [`BufferStatusLine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusWrite {
    /// The text that was written.
    pub text: String,

    /// The control request sent with the text, if any.
    pub control: Option<LineControl>,
}

/// The status line of a [`BufferOutput`]. Records every write verbatim.
#[derive(Clone, Debug, Default)]
pub struct BufferStatusLine {
    is_terminal: bool,
    writes: Vec<StatusWrite>,
}

impl BufferStatusLine {
    /// Returns every write made so far, in order.
    pub fn writes(&self) -> &[StatusWrite] {
        &self.writes
    }
}

impl StatusLine for BufferStatusLine {
    fn write(&mut self, text: &str, control: Option<LineControl>) -> io::Result<()> {
        self.writes.push(StatusWrite {
            text: text.to_owned(),
            control,
        });
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.is_terminal
    }
}

/// An in-memory [`OutputSink`].
///
/// Unlike [`TerminalOutput`], `panic` and `exit` only record what was requested.
#[derive(Clone, Debug, Default)]
pub struct BufferOutput {
    lines: Vec<String>,
    status_line: BufferStatusLine,
    panic_message: Option<String>,
    exit_code: Option<i32>,
}

impl BufferOutput {
    /// Creates a buffer whose status line reports the given interactivity.
    pub fn new(is_terminal: bool) -> Self {
        Self {
            status_line: BufferStatusLine {
                is_terminal,
                writes: Vec::new(),
            },
            ..Self::default()
        }
    }

    /// Returns the full lines printed so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the printed lines joined with newlines, with a trailing newline if non-empty.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Returns the status line writes made so far.
    pub fn status_writes(&self) -> &[StatusWrite] {
        self.status_line.writes()
    }

    /// Returns the message passed to `panic`, if it was called.
    pub fn panic_message(&self) -> Option<&str> {
        self.panic_message.as_deref()
    }

    /// Returns the code passed to `exit`, if it was called.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

impl OutputSink for BufferOutput {
    fn puts(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_owned());
        Ok(())
    }

    fn panic(&mut self, message: &str) -> io::Result<()> {
        self.lines.push(message.to_owned());
        self.panic_message = Some(message.to_owned());
        Ok(())
    }

    fn exit(&mut self, code: i32) -> io::Result<()> {
        self.exit_code = Some(code);
        Ok(())
    }

    fn status_line(&mut self) -> &mut dyn StatusLine {
        &mut self.status_line
    }
}
