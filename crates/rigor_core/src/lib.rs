#![forbid(unsafe_code)]
//! Shared data model for the rigor test harness.
//!
//! This crate owns the pieces of a run that carry no async or I/O concerns:
//!
//! - [`Failure`]: one recorded failure (mismatch, returned error, panic, cleanup error)
//! - [`TestContext`]: the per-test assertion context that accumulates failures
//! - [`RunAggregate`]: the cumulative pass/fail result set for one run
//!
//! The execution engine, render scheduler and presenter live in the `rigor` crate and consume these types.
//!
//! ## Panic Policy
//!
//! Production code returns `Result`/`Option`. The single deliberate panic is [`RunAggregate::record_pass`] /
//! [`RunAggregate::record_fail`] on a double classification, which is a bookkeeping invariant violation; callers
//! that need to recover use the `try_` variants.

#![deny(clippy::unwrap_used)]

pub mod aggregate;
pub mod context;
pub mod failure;

pub use aggregate::{AggregateError, FailedTest, RunAggregate, SuiteFailures, SuitePasses};
pub use context::TestContext;
pub use failure::{Failure, PanicSite, TestError, TestResult};
