//! Result presentation.
//!
//! - `tree` - builds and renders the result tree from an aggregate snapshot
//! - `theme` - colors and indentation
//! - `surface` - where frames are written (terminal, in-memory buffer)
//! - `log` - the post-run diagnostic dump

pub mod log;
pub mod surface;
pub mod theme;
pub mod tree;

use std::io;

use rigor_core::RunAggregate;

pub use log::{RESULTS_TARGET, format_log, log_results};
pub use surface::{BufferSurface, OutputSurface, TerminalSurface};
pub use theme::{Theme, Tone};
pub use tree::ResultTree;

/// Renders aggregate snapshots onto a surface.
pub struct Presenter {
    surface: Box<dyn OutputSurface>,
    theme: Theme,
}

impl Presenter {
    /// Install `theme` on the surface (once) and render with whichever theme the surface ends up holding.
    pub fn new(mut surface: Box<dyn OutputSurface>, theme: Theme) -> Self {
        surface.install_theme(&theme);
        let theme = surface.theme().unwrap_or(theme);
        Self { surface, theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Replace the surface content with the current state of `aggregate`.
    pub fn render(&mut self, aggregate: &RunAggregate) -> io::Result<()> {
        let text = ResultTree::build(aggregate).render(&self.theme);
        self.surface.replace(&text)
    }
}
