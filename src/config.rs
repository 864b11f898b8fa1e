//! Harness configuration

use std::env;
use std::time::Duration;

use crate::error::{HarnessError, HarnessResult};
use crate::presenter::Theme;

/// Environment variable overriding the frame interval, in milliseconds.
pub const FRAME_MS_VAR: &str = "RIGOR_FRAME_MS";
/// Presence (with any non-empty value) disables colored output.
pub const NO_COLOR_VAR: &str = "NO_COLOR";

/// Configuration for a test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Time between refresh opportunities of the live view
    pub frame_interval: Duration,
    /// Whether to render with ANSI colors
    pub color: bool,
    /// Whether to emit the results dump to the log after the run
    pub log_results: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            color: true,
            log_results: true,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, overridden by `RIGOR_FRAME_MS` and `NO_COLOR`.
    pub fn from_env() -> HarnessResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults, overridden by whatever `lookup` returns for the known variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> HarnessResult<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(FRAME_MS_VAR) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                HarnessError::InvalidConfig(format!("{FRAME_MS_VAR} must be a whole number of milliseconds, got {raw:?}"))
            })?;
            config.frame_interval = Duration::from_millis(millis);
        }
        if lookup(NO_COLOR_VAR).is_some_and(|value| !value.is_empty()) {
            config.color = false;
        }
        Ok(config)
    }

    /// Set the frame interval
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Enable or disable colors
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Enable or disable the post-run results dump
    pub fn with_log_results(mut self, log_results: bool) -> Self {
        self.log_results = log_results;
        self
    }

    /// The theme this config asks for.
    pub fn theme(&self) -> Theme {
        if self.color { Theme::ansi() } else { Theme::plain() }
    }
}
