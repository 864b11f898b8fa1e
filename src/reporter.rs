//! Test reporter trait
//!
//! The engine separates reporting from execution through the [`TestReporter`] trait. The live result view is the
//! presenter's job; reporters receive the per-test event stream (for logs, progress output, custom formats).

use std::time::Duration;

use tracing::{debug, info};

use crate::discovery::DiscoveredTest;
use crate::engine::{TestOutcome, TestStatus};

/// Summary of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Trait for reporting test execution events.
pub trait TestReporter {
    /// Called once before the first test, with the number of discovered tests
    fn on_run_start(&mut self, _test_count: usize) {}

    /// Called when a test is about to run
    fn on_test_start(&mut self, _test: &DiscoveredTest<'_>) {}

    /// Called when a test has been classified and recorded
    fn on_test_complete(&mut self, outcome: &TestOutcome);

    /// Called when all tests have completed
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Reporter that ignores every event.
#[derive(Debug, Default)]
pub struct NoopReporter;

impl TestReporter for NoopReporter {
    fn on_test_complete(&mut self, _outcome: &TestOutcome) {}

    fn on_run_complete(&mut self, _summary: &RunSummary) {}
}

/// Reporter that emits `tracing` events.
#[derive(Debug, Default)]
pub struct LogReporter;

impl TestReporter for LogReporter {
    fn on_run_start(&mut self, test_count: usize) {
        info!(tests = test_count, "test run started");
    }

    fn on_test_start(&mut self, test: &DiscoveredTest<'_>) {
        debug!(suite = test.suite_name(), test = test.name, "running");
    }

    fn on_test_complete(&mut self, outcome: &TestOutcome) {
        match outcome.status {
            TestStatus::Passed => debug!(
                suite = %outcome.suite,
                test = outcome.test,
                elapsed_ms = outcome.duration.as_millis() as u64,
                "passed"
            ),
            TestStatus::Failed => info!(
                suite = %outcome.suite,
                test = outcome.test,
                failures = outcome.failures.len(),
                elapsed_ms = outcome.duration.as_millis() as u64,
                "failed"
            ),
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        info!(
            passed = summary.passed,
            failed = summary.failed,
            elapsed = ?summary.duration,
            "test run finished"
        );
    }
}
