//! Output surfaces: where rendered results go.

use std::cell::RefCell;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

use super::theme::Theme;

/// A target that shows the latest rendered results.
pub trait OutputSurface {
    /// Install presentation styling. Returns `false` (and changes nothing) if a theme is already installed.
    fn install_theme(&mut self, theme: &Theme) -> bool;

    /// The installed theme, if any.
    fn theme(&self) -> Option<Theme>;

    /// Replace everything previously shown with `content`.
    fn replace(&mut self, content: &str) -> io::Result<()>;
}

/// Writes frames to a terminal (or any writer).
///
/// In rewrite mode each frame moves the cursor back over the previous one and clears to the end of the screen, so
/// the latest results are drawn in place. Otherwise frames are appended one after another.
///
/// Moving back counts terminal rows, not lines: with a known width, a line longer than the terminal counts once per
/// row it wraps onto. Without one, every line counts as one row.
pub struct TerminalSurface<W: Write> {
    writer: W,
    theme: Option<Theme>,
    rewrite: bool,
    width: Option<usize>,
    rows_shown: usize,
}

impl TerminalSurface<io::Stdout> {
    /// Stdout, rewriting in place when it is a terminal.
    pub fn stdout() -> Self {
        let stdout = io::stdout();
        let rewrite = stdout.is_terminal();
        let surface = Self::new(stdout, rewrite);
        match crossterm::terminal::size() {
            Ok((columns, _)) if rewrite => surface.with_width(columns),
            _ => surface,
        }
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(writer: W, rewrite: bool) -> Self {
        Self {
            writer,
            theme: None,
            rewrite,
            width: None,
            rows_shown: 0,
        }
    }

    /// Terminal width in columns, used to count wrapped rows. Zero means unknown.
    pub fn with_width(mut self, columns: u16) -> Self {
        self.width = (columns > 0).then_some(usize::from(columns));
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSurface for TerminalSurface<W> {
    fn install_theme(&mut self, theme: &Theme) -> bool {
        if self.theme.is_some() {
            return false;
        }
        self.theme = Some(*theme);
        true
    }

    fn theme(&self) -> Option<Theme> {
        self.theme
    }

    fn replace(&mut self, content: &str) -> io::Result<()> {
        if self.rewrite && self.rows_shown > 0 {
            write!(self.writer, "\x1b[{}F\x1b[J", self.rows_shown)?;
        }
        self.writer.write_all(content.as_bytes())?;
        if !content.is_empty() && !content.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        self.rows_shown = content.lines().map(|line| rows(line, self.width)).sum();
        Ok(())
    }
}

/// Terminal rows taken by one line at `width` columns.
fn rows(line: &str, width: Option<usize>) -> usize {
    match width {
        Some(width) => visible_width(line).div_ceil(width).max(1),
        None => 1,
    }
}

/// Printed width of `line`, skipping ANSI escape sequences.
fn visible_width(line: &str) -> usize {
    let mut width = 0;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            width += 1;
            continue;
        }
        // CSI sequences end at the first byte in `@..=~`.
        if chars.next() == Some('[') {
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        }
    }
    width
}

#[derive(Debug, Default)]
struct Buffer {
    content: String,
    frames: usize,
    theme: Option<Theme>,
}

/// In-memory surface. Clones share the same buffer, so a caller can keep a handle and inspect it after the run.
#[derive(Debug, Clone, Default)]
pub struct BufferSurface {
    buffer: Rc<RefCell<Buffer>>,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered frame.
    pub fn contents(&self) -> String {
        self.buffer.borrow().content.clone()
    }

    /// How many times the content was replaced.
    pub fn frames(&self) -> usize {
        self.buffer.borrow().frames
    }
}

impl OutputSurface for BufferSurface {
    fn install_theme(&mut self, theme: &Theme) -> bool {
        let mut buffer = self.buffer.borrow_mut();
        if buffer.theme.is_some() {
            return false;
        }
        buffer.theme = Some(*theme);
        true
    }

    fn theme(&self) -> Option<Theme> {
        self.buffer.borrow().theme
    }

    fn replace(&mut self, content: &str) -> io::Result<()> {
        let mut buffer = self.buffer.borrow_mut();
        buffer.content.clear();
        buffer.content.push_str(content);
        buffer.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_installs_once() {
        let mut surface = BufferSurface::new();
        assert!(surface.install_theme(&Theme::plain()));
        assert!(!surface.install_theme(&Theme::ansi()));
        assert_eq!(surface.theme(), Some(Theme::plain()));
    }

    #[test]
    fn test_buffer_replaces_content() {
        let mut surface = BufferSurface::new();
        let handle = surface.clone();
        surface.replace("first\n").unwrap();
        surface.replace("second\n").unwrap();
        assert_eq!(handle.contents(), "second\n");
        assert_eq!(handle.frames(), 2);
    }

    #[test]
    fn test_terminal_rewrites_previous_frame() {
        let mut surface = TerminalSurface::new(Vec::new(), true);
        surface.replace("a\nb\n").unwrap();
        surface.replace("c\n").unwrap();
        let written = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(written, "a\nb\n\x1b[2F\x1b[Jc\n");
    }

    #[test]
    fn test_terminal_rewind_counts_wrapped_rows() {
        let mut surface = TerminalSurface::new(Vec::new(), true).with_width(10);
        surface.replace("short\n0123456789ABCDE\n\n").unwrap();
        surface.replace("c\n").unwrap();
        let written = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(written, "short\n0123456789ABCDE\n\n\x1b[4F\x1b[Jc\n");
    }

    #[test]
    fn test_escape_sequences_take_no_columns() {
        assert_eq!(visible_width("\x1b[1;37mTest results\x1b[0m"), 12);
        assert_eq!(rows("\x1b[31m0123456789\x1b[0m", Some(10)), 1);
        assert_eq!(rows("0123456789x", Some(10)), 2);
        assert_eq!(rows("", Some(10)), 1);
        assert_eq!(rows("0123456789x", None), 1);
    }

    #[test]
    fn test_terminal_appends_without_rewrite() {
        let mut surface = TerminalSurface::new(Vec::new(), false);
        surface.replace("a").unwrap();
        surface.replace("b\n").unwrap();
        let written = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(written, "a\nb\n");
    }
}
