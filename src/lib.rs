#![forbid(unsafe_code)]
//! rigor: an in-process async test harness
//!
//! Suites are plain Rust types. `#[rigor::suite]` registers their `test`-prefixed methods; the harness discovers
//! them, runs them one at a time (awaiting async bodies), and keeps a live result view up to date while it goes.
//!
//! ```ignore
//! use rigor::{Suite, TestContext, TestResult};
//!
//! struct MathSuite {
//!     t: TestContext,
//! }
//!
//! impl Suite for MathSuite {
//!     const NAME: &'static str = "MathSuite";
//!
//!     fn create(t: TestContext) -> Self {
//!         Self { t }
//!     }
//! }
//!
//! #[rigor::suite]
//! impl MathSuite {
//!     fn test_add(&mut self) {
//!         self.t.compare(1 + 1, 2);
//!     }
//!
//!     async fn test_later(&mut self) -> TestResult {
//!         tokio::task::yield_now().await;
//!         self.t.compare("a", "a");
//!         Ok(())
//!     }
//! }
//!
//! let report = rigor::Harness::default().run_blocking(&rigor::suites![MathSuite], rigor::TerminalSurface::stdout())?;
//! ```
//!
//! ## Modules
//!
//! - `suite` - the suite contract and type-erased suite definitions
//! - `discovery` - which registered names are tests, in which order
//! - `engine` - per-test lifecycle and the sequential runner
//! - `scheduler` - coalesced rendering on frame boundaries
//! - `presenter` - result tree, themes, output surfaces, the results log dump
//! - `harness` - the run entry point
//!
//! ## Panic Policy
//!
//! - **Production code**: `Result`/`Option` with `?`. Panics raised by test bodies and cleanup hooks are caught and
//!   recorded as failures; they never unwind out of a run.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

#![deny(clippy::unwrap_used)]

extern crate self as rigor;

pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod harness;
pub mod presenter;
pub mod reporter;
pub mod scheduler;
pub mod suite;

pub use rigor_core::{
    AggregateError, FailedTest, Failure, PanicSite, RunAggregate, SuiteFailures, SuitePasses, TestContext, TestError,
    TestResult,
};
pub use rigor_derive::suite;

pub use config::HarnessConfig;
pub use discovery::{DiscoveredTest, PrefixDiscovery, TestDiscovery, discover};
pub use engine::{TestOutcome, TestState, TestStatus};
pub use error::{HarnessError, HarnessResult};
pub use harness::{Harness, RunReport, run_tests};
pub use presenter::{BufferSurface, OutputSurface, ResultTree, TerminalSurface, Theme};
pub use reporter::{LogReporter, NoopReporter, RunSummary, TestReporter};
pub use scheduler::{FrameClock, ManualFrameClock, RenderScheduler, TokioFrameClock};
pub use suite::{IntoTestResult, RegisterTests, Suite, SuiteDefinition, TestBody, TestCase, TestFuture};
