//! Execution engine
//!
//! Runs discovered tests one at a time, in discovery order. Every test goes through the same lifecycle:
//!
//! ```text
//! Pending -> Running -> Passed | Failed -> Reported
//! ```
//!
//! - **Pending → Running**: a fresh [`TestContext`] and a fresh suite instance bound to it.
//! - **Running → Passed/Failed**: the body runs (async bodies are awaited to completion). A returned error or a
//!   panic, including one raised across an `.await`, is appended to the context. Cleanup then runs exactly once,
//!   and its own error or panic is appended after the body's failures. The test failed iff the context holds any
//!   failure.
//! - **→ Reported**: the aggregate is updated, the reporter is told, and a render is requested.
//!
//! A test never starts before the previous one has been reported, so one test's failure cannot leak into another.
//!
//! Panics raised while a test runs are reported through the failure list only. A process-wide panic hook, installed
//! on first use, records the panic location (and a backtrace when `RUST_BACKTRACE` is set) for the thread that is
//! executing a test and prints nothing; panics on any other thread go to the previous hook unchanged.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Once;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use rigor_core::{Failure, PanicSite, RunAggregate, TestContext};
use tracing::{Instrument, debug, debug_span};

use crate::discovery::DiscoveredTest;
use crate::error::HarnessResult;
use crate::reporter::{RunSummary, TestReporter};
use crate::scheduler::RenderScheduler;

/// Lifecycle state of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestState {
    Pending,
    Running,
    Passed,
    Failed,
    Reported,
}

impl TestState {
    /// Whether `self -> next` is a legal lifecycle step.
    pub fn can_advance_to(self, next: TestState) -> bool {
        matches!(
            (self, next),
            (TestState::Pending, TestState::Running)
                | (TestState::Pending, TestState::Failed)
                | (TestState::Running, TestState::Passed)
                | (TestState::Running, TestState::Failed)
                | (TestState::Passed, TestState::Reported)
                | (TestState::Failed, TestState::Reported)
        )
    }
}

/// Final classification of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed,
}

/// Result of running one test.
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub suite: String,
    pub test: &'static str,
    pub status: TestStatus,
    pub failures: Vec<Failure>,
    pub duration: Duration,
    /// Lifecycle states the test went through, in order.
    pub states: Vec<TestState>,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

struct Lifecycle {
    states: Vec<TestState>,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            states: vec![TestState::Pending],
        }
    }

    fn current(&self) -> TestState {
        self.states.last().copied().unwrap_or(TestState::Pending)
    }

    fn advance(&mut self, next: TestState) {
        let current = self.current();
        debug_assert!(current.can_advance_to(next), "illegal transition {current:?} -> {next:?}");
        debug!(from = ?current, to = ?next, "transition");
        self.states.push(next);
    }
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

fn install_capture_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !CAPTURING.with(Cell::get) {
                previous(info);
                return;
            }
            let backtrace = Backtrace::capture();
            let site = PanicSite {
                location: info.location().map(ToString::to_string),
                backtrace: match backtrace.status() {
                    BacktraceStatus::Captured => Some(backtrace.to_string()),
                    _ => None,
                },
            };
            LAST_PANIC.with(|last| *last.borrow_mut() = Some(site));
        }));
    });
}

/// Marks the current thread as executing a test for as long as it lives.
struct PanicCapture {
    outer: bool,
}

impl PanicCapture {
    fn enter() -> Self {
        install_capture_hook();
        LAST_PANIC.with(|last| last.borrow_mut().take());
        Self {
            outer: CAPTURING.with(|capturing| capturing.replace(true)),
        }
    }

    /// Site of the most recent panic on this thread, consumed.
    fn take_site(&self) -> PanicSite {
        LAST_PANIC.with(|last| last.borrow_mut().take()).unwrap_or_default()
    }
}

impl Drop for PanicCapture {
    fn drop(&mut self) {
        CAPTURING.with(|capturing| capturing.set(self.outer));
    }
}

/// Run one test through Pending → Passed/Failed.
///
/// Never fails: everything the test does ends up in the outcome's failure list.
pub async fn execute(test: &DiscoveredTest<'_>) -> TestOutcome {
    let span = debug_span!("test", suite = test.suite_name(), test = test.name);
    execute_inner(test).instrument(span).await
}

async fn execute_inner(test: &DiscoveredTest<'_>) -> TestOutcome {
    let started = Instant::now();
    let mut lifecycle = Lifecycle::new();
    let ctx = TestContext::new();
    let capture = PanicCapture::enter();

    match panic::catch_unwind(AssertUnwindSafe(|| test.suite.instantiate(ctx.clone()))) {
        Ok(mut instance) => {
            lifecycle.advance(TestState::Running);

            match AssertUnwindSafe(instance.invoke(test.test_index)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => ctx.record(Failure::from_error(&error)),
                Err(payload) => ctx.record(Failure::from_panic(payload.as_ref(), capture.take_site())),
            }

            match panic::catch_unwind(AssertUnwindSafe(|| instance.cleanup())) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => ctx.record(Failure::cleanup_error(&error)),
                Err(payload) => ctx.record(Failure::cleanup_panic(payload.as_ref(), capture.take_site())),
            }
        }
        // No instance means no body and nothing to clean up.
        Err(payload) => ctx.record(Failure::from_panic(payload.as_ref(), capture.take_site())),
    }
    drop(capture);

    let failures = ctx.take_failures();
    let status = if failures.is_empty() {
        lifecycle.advance(TestState::Passed);
        TestStatus::Passed
    } else {
        lifecycle.advance(TestState::Failed);
        TestStatus::Failed
    };

    TestOutcome {
        suite: test.suite_name().to_string(),
        test: test.name,
        status,
        failures,
        duration: started.elapsed(),
        states: lifecycle.states,
    }
}

/// Drives discovered tests through execution and reporting.
pub struct Runner<'r> {
    aggregate: Rc<RefCell<RunAggregate>>,
    scheduler: &'r RenderScheduler,
    reporter: &'r mut dyn TestReporter,
}

impl<'r> Runner<'r> {
    pub fn new(
        aggregate: Rc<RefCell<RunAggregate>>,
        scheduler: &'r RenderScheduler,
        reporter: &'r mut dyn TestReporter,
    ) -> Self {
        Self {
            aggregate,
            scheduler,
            reporter,
        }
    }

    /// Run every test, strictly in order.
    ///
    /// Test failures never end the run early. The only error is a bookkeeping one: the same (suite, test) pair
    /// being classified twice, which is fatal.
    pub async fn run<'a, I>(&mut self, tests: I) -> HarnessResult<RunSummary>
    where
        I: IntoIterator<Item = DiscoveredTest<'a>>,
    {
        let started = Instant::now();
        let mut summary = RunSummary {
            total: 0,
            passed: 0,
            failed: 0,
            duration: Duration::ZERO,
        };

        for test in tests {
            self.reporter.on_test_start(&test);
            let mut outcome = execute(&test).await;
            self.report(&mut outcome)?;

            summary.total += 1;
            if outcome.passed() {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }

            // Give due frame callbacks a chance to run between tests.
            tokio::task::yield_now().await;
        }

        summary.duration = started.elapsed();
        Ok(summary)
    }

    fn report(&mut self, outcome: &mut TestOutcome) -> HarnessResult<()> {
        {
            let mut aggregate = self.aggregate.borrow_mut();
            match outcome.status {
                TestStatus::Passed => aggregate.try_record_pass(&outcome.suite, outcome.test)?,
                TestStatus::Failed => {
                    aggregate.try_record_fail(&outcome.suite, outcome.test, outcome.failures.clone())?
                }
            }
        }
        outcome.states.push(TestState::Reported);
        self.reporter.on_test_complete(outcome);
        self.scheduler.notify();
        Ok(())
    }
}
