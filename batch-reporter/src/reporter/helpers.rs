// Copyright (c) The batch-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use owo_colors::Style;

#[derive(Debug, Default, Clone)]
pub(crate) struct Styles {
    pub(crate) name: Style,
    pub(crate) pass: Style,
    pub(crate) fail: Style,
    pub(crate) fail_name: Style,
}

impl Styles {
    pub(crate) fn colorize(&mut self) {
        self.name = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.fail_name = Style::new().red().bold();
    }
}

/// Glyphs used in output.
#[derive(Debug, Clone)]
pub(crate) struct ThemeCharacters {
    pub(crate) pass: &'static str,
    pub(crate) fail: &'static str,
}

impl Default for ThemeCharacters {
    fn default() -> Self {
        Self {
            pass: "+",
            fail: "x",
        }
    }
}

impl ThemeCharacters {
    pub(crate) fn use_unicode(&mut self) {
        self.pass = "✓";
        self.fail = "✗";
    }
}

/// Spinner frames, advanced once per render.
pub(crate) const SPINNER_FRAMES: [char; 4] = ['/', '|', '\\', '-'];

/// Rounds `value` to `digits` decimal places, with ties going up.
///
/// `format!("{:.N}")` rounds ties to even, so 12.5 would print as 12. Values shown to users round
/// ties up instead.
pub(crate) fn round_half_up(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale + 0.5).floor() / scale
}
