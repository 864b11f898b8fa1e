//! CLI for the `rigor-demo` binary
//!
//! Runs the bundled demonstration suites with a live result view on stdout.
//!
//! ## Flags
//!
//! - `--frame-ms <MS>` - time between live view refreshes (default 16, or `RIGOR_FRAME_MS`)
//! - `--no-color` - plain output (also enabled by `NO_COLOR`)
//! - `-q, --quiet` - skip the results dump in the log after the run
//! - `-v, --verbose` - log every test as it completes; frames are appended instead of redrawn in place
//!
//! ## Design
//!
//! Argument parsing uses clap derive. `execute` returns `CliResult<ExitCode>`; only `run()` prints errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod demo;

use std::fmt;
use std::io;
use std::process;
use std::time::Duration;

use clap::Parser;

use crate::config::HarnessConfig;
use crate::harness::Harness;
use crate::presenter::TerminalSurface;
use crate::reporter::{LogReporter, NoopReporter};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Harness errors exit with code 2, so they can be told apart from failing tests.
    pub fn harness(err: impl fmt::Display) -> Self {
        Self::new(format!("Error: {err}"), ExitCode(2))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run the rigor demonstration suites
#[derive(Parser, Debug)]
#[command(name = "rigor-demo")]
#[command(version = VERSION)]
#[command(about = "Run the rigor demonstration suites", long_about = None)]
pub struct Cli {
    /// Milliseconds between live view refreshes
    #[arg(long = "frame-ms", value_name = "MS")]
    pub frame_ms: Option<u64>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Skip the results dump after the run
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log each test as it completes
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Environment configuration with the command-line flags applied on top.
    pub fn config(&self) -> CliResult<HarnessConfig> {
        let mut config = HarnessConfig::from_env().map_err(CliError::harness)?;
        if let Some(millis) = self.frame_ms {
            config = config.with_frame_interval(Duration::from_millis(millis));
        }
        if self.no_color {
            config = config.with_color(false);
        }
        if self.quiet {
            config = config.with_log_results(false);
        }
        Ok(config)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the run and map its outcome to an exit code.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.config()?;
    let suites = demo::suites();

    let harness = Harness::new(config);
    let result = if cli.verbose {
        harness
            .reporter(LogReporter)
            .run_blocking(&suites, TerminalSurface::new(io::stdout(), false))
    } else {
        harness.reporter(NoopReporter).run_blocking(&suites, TerminalSurface::stdout())
    };
    let report = result.map_err(CliError::harness)?;

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["rigor-demo"]).unwrap();
        assert_eq!(cli.frame_ms, None);
        assert!(!cli.no_color);
        assert!(!cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_flags() {
        let cli = Cli::try_parse_from(["rigor-demo", "--frame-ms", "50", "--no-color", "-q"]).unwrap();
        assert_eq!(cli.frame_ms, Some(50));
        assert!(cli.no_color);
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["rigor-demo", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_cli_rejects_non_numeric_frame_ms() {
        assert!(Cli::try_parse_from(["rigor-demo", "--frame-ms", "soon"]).is_err());
    }

    #[test]
    fn test_harness_errors_exit_with_code_two() {
        let err = CliError::harness("runtime unavailable");
        assert_eq!(err.exit_code, ExitCode(2));
        assert_eq!(err.to_string(), "Error: runtime unavailable");
    }
}
