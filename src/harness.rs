//! Run entry point.
//!
//! A run wires the pieces together around one shared [`RunAggregate`]:
//!
//! 1. the surface gets its theme (once), and a [`RenderScheduler`] is set up to redraw it from the aggregate;
//! 2. the [`Runner`] executes every discovered test in order, recording each result and notifying the scheduler;
//! 3. the final state is flushed to the surface, the results dump is logged, and the reporter gets the summary.
//!
//! Everything runs on the current thread. Each run drives its own [`tokio::task::LocalSet`], so frame callbacks of
//! the default [`TokioFrameClock`] have somewhere to go whether or not the caller is already inside one. The run
//! still needs a tokio runtime; [`Harness::run_blocking`] builds one.

use std::cell::RefCell;
use std::rc::Rc;

use rigor_core::RunAggregate;
use tokio::task::LocalSet;
use tracing::{Instrument, debug, info_span};

use crate::config::HarnessConfig;
use crate::discovery::{PrefixDiscovery, TestDiscovery, discover};
use crate::engine::Runner;
use crate::error::{HarnessError, HarnessResult};
use crate::presenter::{OutputSurface, Presenter, log_results};
use crate::reporter::{LogReporter, RunSummary, TestReporter};
use crate::scheduler::{FrameClock, RenderScheduler, TokioFrameClock};
use crate::suite::SuiteDefinition;

/// Outcome of a whole run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    /// Final pass/fail mappings.
    pub aggregate: RunAggregate,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }
}

/// Configurable test run.
///
/// ```ignore
/// let report = Harness::new(HarnessConfig::from_env()?)
///     .run_blocking(&rigor::suites![MathSuite], TerminalSurface::stdout())?;
/// ```
pub struct Harness {
    config: HarnessConfig,
    reporter: Box<dyn TestReporter>,
    clock: Option<Box<dyn FrameClock>>,
    discovery: Box<dyn TestDiscovery>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            reporter: Box::new(LogReporter),
            clock: None,
            discovery: Box::new(PrefixDiscovery::default()),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Replace the default [`LogReporter`].
    pub fn reporter(mut self, reporter: impl TestReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Replace the default [`TokioFrameClock`] (which ticks at `config.frame_interval`).
    pub fn frame_clock(mut self, clock: impl FrameClock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn discovery(mut self, discovery: impl TestDiscovery + 'static) -> Self {
        self.discovery = Box::new(discovery);
        self
    }

    /// Run every test of `suites` and present the results on `surface`.
    ///
    /// Must be awaited on a tokio runtime. Frame callbacks are spawned on a `LocalSet` owned by this run; any still
    /// queued when the run returns are dropped.
    pub async fn run(self, suites: &[SuiteDefinition], surface: impl OutputSurface + 'static) -> HarnessResult<RunReport> {
        let span = info_span!("run", suites = suites.len());
        let local = LocalSet::new();
        local
            .run_until(self.run_inner(suites, Box::new(surface)))
            .instrument(span)
            .await
    }

    /// Like [`run`](Self::run), on a fresh current-thread runtime.
    pub fn run_blocking(
        self,
        suites: &[SuiteDefinition],
        surface: impl OutputSurface + 'static,
    ) -> HarnessResult<RunReport> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(HarnessError::Runtime)?;
        runtime.block_on(self.run(suites, surface))
    }

    async fn run_inner(self, suites: &[SuiteDefinition], surface: Box<dyn OutputSurface>) -> HarnessResult<RunReport> {
        let Harness {
            config,
            mut reporter,
            clock,
            discovery,
        } = self;

        let aggregate = Rc::new(RefCell::new(RunAggregate::new()));
        let mut presenter = Presenter::new(surface, config.theme());
        let clock = clock.unwrap_or_else(|| -> Box<dyn FrameClock> {
            Box::new(TokioFrameClock::new(config.frame_interval))
        });
        let snapshot = Rc::clone(&aggregate);
        let scheduler = RenderScheduler::with_boxed(clock, Box::new(move || presenter.render(&snapshot.borrow())));

        reporter.on_run_start(discover(discovery.as_ref(), suites).count());

        let summary = {
            let mut runner = Runner::new(Rc::clone(&aggregate), &scheduler, reporter.as_mut());
            runner.run(discover(discovery.as_ref(), suites)).await?
        };

        let flushed = scheduler.flush()?;
        debug!(flushed, renders = scheduler.render_count(), "final render");
        drop(scheduler);

        if config.log_results {
            log_results(&aggregate.borrow());
        }
        reporter.on_run_complete(&summary);

        let aggregate = Rc::try_unwrap(aggregate)
            .map(RefCell::into_inner)
            .unwrap_or_else(|shared| shared.borrow().clone());
        Ok(RunReport { summary, aggregate })
    }
}

/// Run `suites` with the default configuration.
///
/// Must be awaited on a tokio runtime; a surrounding [`tokio::task::LocalSet`] is not needed.
pub async fn run_tests(suites: &[SuiteDefinition], surface: impl OutputSurface + 'static) -> HarnessResult<RunReport> {
    Harness::default().run(suites, surface).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::TestOutcome;
    use crate::presenter::{BufferSurface, Theme};
    use crate::scheduler::ManualFrameClock;
    use crate::suite::{RegisterTests, Suite, TestCase};
    use rigor_core::TestContext;

    struct Arithmetic {
        t: TestContext,
    }

    impl Suite for Arithmetic {
        const NAME: &'static str = "Arithmetic";

        fn create(t: TestContext) -> Self {
            Self { t }
        }
    }

    impl RegisterTests for Arithmetic {
        fn tests() -> Vec<TestCase<Self>> {
            vec![
                TestCase::sync("test_add", |s| {
                    s.t.compare(1 + 1, 2);
                    Ok(())
                }),
                TestCase::sync("test_sub", |s| {
                    s.t.compare(3 - 1, 1);
                    Ok(())
                }),
            ]
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl TestReporter for Recorder {
        fn on_run_start(&mut self, test_count: usize) {
            self.events.borrow_mut().push(format!("start {test_count}"));
        }

        fn on_test_complete(&mut self, outcome: &TestOutcome) {
            let status = if outcome.passed() { "pass" } else { "fail" };
            self.events.borrow_mut().push(format!("{status} {}", outcome.test));
        }

        fn on_run_complete(&mut self, summary: &RunSummary) {
            self.events
                .borrow_mut()
                .push(format!("done {}/{}", summary.passed, summary.total));
        }
    }

    fn quiet() -> HarnessConfig {
        HarnessConfig::new().with_color(false).with_log_results(false)
    }

    #[test]
    fn test_final_state_is_rendered_without_any_frame() {
        let clock = ManualFrameClock::new();
        let surface = BufferSurface::new();
        let report = Harness::new(quiet())
            .frame_clock(clock.clone())
            .run_blocking(&[SuiteDefinition::of::<Arithmetic>()], surface.clone())
            .unwrap();

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.failed, 1);
        assert!(!report.is_success());
        assert_eq!(surface.frames(), 1);
        assert!(surface.contents().starts_with("Test results\nFailures (1)\n"));

        // The frame requested during the run finds nothing left to draw.
        clock.advance();
        assert_eq!(surface.frames(), 1);
    }

    #[test]
    fn test_reporter_sees_every_event() {
        let recorder = Recorder::default();
        Harness::new(quiet())
            .frame_clock(ManualFrameClock::new())
            .reporter(recorder.clone())
            .run_blocking(&[SuiteDefinition::of::<Arithmetic>()], BufferSurface::new())
            .unwrap();

        assert_eq!(
            *recorder.events.borrow(),
            ["start 2", "pass test_add", "fail test_sub", "done 1/2"]
        );
    }

    #[test]
    fn test_theme_comes_from_config_unless_already_installed() {
        let surface = BufferSurface::new();
        Harness::new(HarnessConfig::new().with_log_results(false))
            .frame_clock(ManualFrameClock::new())
            .run_blocking(&[], surface.clone())
            .unwrap();
        assert_eq!(surface.theme(), Some(Theme::ansi()));
    }

    #[test]
    fn test_duplicate_pair_is_fatal() {
        let suites = vec![SuiteDefinition::of::<Arithmetic>(), SuiteDefinition::of::<Arithmetic>()];
        let err = Harness::new(quiet())
            .frame_clock(ManualFrameClock::new())
            .run_blocking(&suites, BufferSurface::new())
            .unwrap_err();
        assert!(matches!(err, HarnessError::DuplicateResult(_)));
    }
}
