//! Recorded failures.
//!
//! A [`Failure`] is one broken expectation attributed to a single test. Failures come from four places:
//!
//! - `TestContext::compare` mismatches (the test keeps running)
//! - an `Err` returned by the test body
//! - a panic raised while the test body ran (including across `.await` points)
//! - an error or panic from the suite's cleanup hook
//!
//! Every failure renders a `trace()`: the message followed by whatever location or backtrace was available when it
//! was recorded.

use std::any::Any;
use std::backtrace::BacktraceStatus;
use std::fmt::Debug;
use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Error returned by test bodies and cleanup hooks.
///
/// Any `std::error::Error` converts into it with `?`, and it captures a backtrace when `RUST_BACKTRACE` is set.
pub type TestError = anyhow::Error;

/// Result of a test body or cleanup hook.
pub type TestResult = Result<(), TestError>;

/// Where a caught panic was raised.
///
/// The panic payload only carries the message; the location (and a backtrace when `RUST_BACKTRACE` is set) is
/// seen by the panic hook, which hands it over as a `PanicSite`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanicSite {
    pub location: Option<String>,
    pub backtrace: Option<String>,
}

impl PanicSite {
    /// Trace lines below the message: `    at <location>`, then the backtrace.
    fn trace_lines(&self) -> Option<String> {
        let mut lines = Vec::new();
        if let Some(location) = &self.location {
            lines.push(format!("    at {location}"));
        }
        if let Some(backtrace) = &self.backtrace {
            lines.push(backtrace.trim_end().to_string());
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// `compare(actual, expected)` found the values unequal.
    #[error("Expected {actual} to equal {expected}")]
    Mismatch {
        actual: String,
        expected: String,
        /// `file:line:column` of the `compare` call.
        location: String,
    },

    /// The test body returned an error.
    #[error("{message}")]
    Error { message: String, stack: Option<String> },

    /// The test body panicked.
    #[error("panicked: {message}")]
    Panic {
        message: String,
        /// `file:line:column` of the panic, as reported to the panic hook.
        location: Option<String>,
        stack: Option<String>,
    },

    /// The cleanup hook returned an error or panicked.
    #[error("cleanup failed: {message}")]
    Cleanup { message: String, stack: Option<String> },
}

impl Failure {
    /// A mismatch between two values, attributed to `location`.
    pub fn mismatch(actual: &dyn Debug, expected: &dyn Debug, location: &Location<'_>) -> Self {
        Failure::Mismatch {
            actual: format!("{actual:?}"),
            expected: format!("{expected:?}"),
            location: location.to_string(),
        }
    }

    /// An error returned by a test body.
    pub fn from_error(error: &TestError) -> Self {
        Failure::Error {
            message: format!("{error:#}"),
            stack: captured_backtrace(error),
        }
    }

    /// A panic payload caught from a test body, raised at `site`.
    pub fn from_panic(payload: &(dyn Any + Send), site: PanicSite) -> Self {
        Failure::Panic {
            message: panic_message(payload),
            location: site.location,
            stack: site.backtrace,
        }
    }

    /// An error returned by a cleanup hook.
    pub fn cleanup_error(error: &TestError) -> Self {
        Failure::Cleanup {
            message: format!("{error:#}"),
            stack: captured_backtrace(error),
        }
    }

    /// A panic payload caught from a cleanup hook, raised at `site`.
    pub fn cleanup_panic(payload: &(dyn Any + Send), site: PanicSite) -> Self {
        Failure::Cleanup {
            message: format!("panicked: {}", panic_message(payload)),
            stack: site.trace_lines(),
        }
    }

    /// Whether this failure came from the cleanup hook.
    pub fn is_cleanup(&self) -> bool {
        matches!(self, Failure::Cleanup { .. })
    }

    /// The message followed by location or backtrace lines, when available.
    pub fn trace(&self) -> String {
        let mut out = self.to_string();
        match self {
            Failure::Mismatch { location, .. } => {
                out.push_str("\n    at ");
                out.push_str(location);
            }
            Failure::Error { stack, .. } | Failure::Cleanup { stack, .. } => {
                if let Some(stack) = stack {
                    out.push('\n');
                    out.push_str(stack.trim_end());
                }
            }
            Failure::Panic { location, stack, .. } => {
                if let Some(location) = location {
                    out.push_str("\n    at ");
                    out.push_str(location);
                }
                if let Some(stack) = stack {
                    out.push('\n');
                    out.push_str(stack.trim_end());
                }
            }
        }
        out
    }
}

/// Extract the message from a panic payload (`&str` or `String`, as produced by `panic!`).
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn captured_backtrace(error: &TestError) -> Option<String> {
    let backtrace = error.backtrace();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_uses_debug_text() {
        let failure = Failure::mismatch(&1, &2, Location::caller());
        assert_eq!(failure.to_string(), "Expected 1 to equal 2");

        let failure = Failure::mismatch(&"a", &"b", Location::caller());
        assert_eq!(failure.to_string(), r#"Expected "a" to equal "b""#);
    }

    #[test]
    fn test_mismatch_trace_includes_location() {
        let failure = Failure::Mismatch {
            actual: "1".to_string(),
            expected: "2".to_string(),
            location: "tests/math.rs:10:5".to_string(),
        };
        assert_eq!(failure.trace(), "Expected 1 to equal 2\n    at tests/math.rs:10:5");
    }

    #[test]
    fn test_error_message_includes_context_chain() {
        let error = anyhow::anyhow!("connection refused").context("fetching fixture");
        let failure = Failure::from_error(&error);
        match &failure {
            Failure::Error { message, .. } => assert_eq!(message, "fetching fixture: connection refused"),
            other => panic!("expected Error failure, got {other:?}"),
        }
    }

    #[test]
    fn test_panic_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(
            Failure::from_panic(payload.as_ref(), PanicSite::default()).to_string(),
            "panicked: boom"
        );

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(
            Failure::from_panic(payload.as_ref(), PanicSite::default()).to_string(),
            "panicked: owned boom"
        );

        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(
            Failure::from_panic(payload.as_ref(), PanicSite::default()).to_string(),
            "panicked: non-string panic payload"
        );
    }

    #[test]
    fn test_panic_trace_includes_site() {
        let payload: Box<dyn Any + Send> = Box::new("kaboom");
        let site = PanicSite {
            location: Some("tests/widgets.rs:10:55".to_string()),
            backtrace: None,
        };
        let failure = Failure::from_panic(payload.as_ref(), site);
        assert_eq!(failure.trace(), "panicked: kaboom\n    at tests/widgets.rs:10:55");

        let payload: Box<dyn Any + Send> = Box::new("no hook");
        let failure = Failure::from_panic(payload.as_ref(), PanicSite::default());
        assert_eq!(failure.trace(), "panicked: no hook");
    }

    #[test]
    fn test_cleanup_failures_are_marked() {
        let error = anyhow::anyhow!("timer still armed");
        let failure = Failure::cleanup_error(&error);
        assert!(failure.is_cleanup());
        assert_eq!(failure.to_string(), "cleanup failed: timer still armed");

        let payload: Box<dyn Any + Send> = Box::new("mock leaked");
        let site = PanicSite {
            location: Some("src/fixtures.rs:3:9".to_string()),
            backtrace: None,
        };
        let failure = Failure::cleanup_panic(payload.as_ref(), site);
        assert_eq!(failure.to_string(), "cleanup failed: panicked: mock leaked");
        assert_eq!(
            failure.trace(),
            "cleanup failed: panicked: mock leaked\n    at src/fixtures.rs:3:9"
        );
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let failure = Failure::Panic {
            message: "boom".to_string(),
            location: Some("src/lib.rs:1:1".to_string()),
            stack: None,
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "panic");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["location"], "src/lib.rs:1:1");
    }
}
