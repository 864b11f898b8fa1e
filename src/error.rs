//! Harness-level errors.
//!
//! Test failures never show up here: they are recorded per test and end up in the run aggregate. A `HarnessError`
//! means the harness itself could not do its job.

use std::io;

use rigor_core::AggregateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Writing to the output surface failed.
    #[error("output surface error: {0}")]
    Io(#[from] io::Error),

    /// The tokio runtime could not be built.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The same (suite, test) pair was classified twice.
    #[error("duplicate result: {0}")]
    DuplicateResult(#[from] AggregateError),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
