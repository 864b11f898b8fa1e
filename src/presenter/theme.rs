//! Presentation styling for the result tree.

/// Visual role of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Heading,
    Fail,
    Pass,
    Error,
}

/// Colors and indentation used when rendering results.
///
/// Colors are ANSI SGR parameter strings (`"31"`, `"1;37"`); `None` leaves the text unstyled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub heading: Option<&'static str>,
    pub fail: Option<&'static str>,
    pub pass: Option<&'static str>,
    pub error: Option<&'static str>,
    /// Spaces per indentation level.
    pub indent_width: usize,
}

impl Default for Theme {
    fn default() -> Self {
        Self::ansi()
    }
}

impl Theme {
    /// White headings, red failures, bright green passes, dimmed traces.
    pub const fn ansi() -> Self {
        Self {
            heading: Some("1;37"),
            fail: Some("31"),
            pass: Some("92"),
            error: Some("90"),
            indent_width: 2,
        }
    }

    /// Same layout, no escape codes.
    pub const fn plain() -> Self {
        Self {
            heading: None,
            fail: None,
            pass: None,
            error: None,
            indent_width: 2,
        }
    }

    pub fn is_colored(&self) -> bool {
        self.heading.is_some() || self.fail.is_some() || self.pass.is_some() || self.error.is_some()
    }

    fn code(&self, tone: Tone) -> Option<&'static str> {
        match tone {
            Tone::Heading => self.heading,
            Tone::Fail => self.fail,
            Tone::Pass => self.pass,
            Tone::Error => self.error,
        }
    }

    /// Leading whitespace for `level`.
    pub fn indent(&self, level: usize) -> String {
        " ".repeat(level * self.indent_width)
    }

    /// Wrap `text` in the escape codes for `tone`; `bold` adds weight on top of the tone color.
    pub fn paint(&self, text: &str, tone: Option<Tone>, bold: bool) -> String {
        let code = tone.and_then(|tone| self.code(tone));
        match (code, bold && self.is_colored()) {
            (Some(code), true) => format!("\x1b[1;{code}m{text}\x1b[0m"),
            (Some(code), false) => format!("\x1b[{code}m{text}\x1b[0m"),
            (None, true) => format!("\x1b[1m{text}\x1b[0m"),
            (None, false) => text.to_string(),
        }
    }
}
