//! The run aggregate: cumulative pass/fail results for one run.
//!
//! Two mappings keyed by suite name, both preserving first-insertion order:
//!
//! - passes: suite → passing test names
//! - failures: suite → (test → recorded failures)
//!
//! A (suite, test) pair is classified at most once and lives in at most one mapping. Entries are only ever added,
//! never removed. Suites that share a name share an entry.

use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

use crate::failure::Failure;

/// Passing tests of one suite, in recording order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuitePasses {
    pub suite: String,
    pub tests: Vec<String>,
}

/// One failed test and its recorded failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTest {
    pub test: String,
    pub failures: Vec<Failure>,
}

/// Failed tests of one suite, in recording order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteFailures {
    pub suite: String,
    pub tests: Vec<FailedTest>,
}

/// Double classification of a (suite, test) pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("test `{suite}::{test}` was already recorded")]
    AlreadyRecorded { suite: String, test: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunAggregate {
    passes: Vec<SuitePasses>,
    failures: Vec<SuiteFailures>,
    #[serde(skip)]
    pass_index: FxHashMap<String, usize>,
    #[serde(skip)]
    failure_index: FxHashMap<String, usize>,
}

impl RunAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a passing test.
    ///
    /// # Panics
    ///
    /// Panics if `suite::test` was already recorded in either mapping.
    pub fn record_pass(&mut self, suite: &str, test: &str) {
        if let Err(err) = self.try_record_pass(suite, test) {
            panic!("INVARIANT: {err}");
        }
    }

    /// Record a failed test with its failures.
    ///
    /// # Panics
    ///
    /// Panics if `suite::test` was already recorded in either mapping.
    pub fn record_fail(&mut self, suite: &str, test: &str, failures: Vec<Failure>) {
        if let Err(err) = self.try_record_fail(suite, test, failures) {
            panic!("INVARIANT: {err}");
        }
    }

    pub fn try_record_pass(&mut self, suite: &str, test: &str) -> Result<(), AggregateError> {
        self.ensure_unrecorded(suite, test)?;
        let index = match self.pass_index.get(suite) {
            Some(&index) => index,
            None => {
                self.passes.push(SuitePasses {
                    suite: suite.to_string(),
                    tests: Vec::new(),
                });
                self.pass_index.insert(suite.to_string(), self.passes.len() - 1);
                self.passes.len() - 1
            }
        };
        self.passes[index].tests.push(test.to_string());
        Ok(())
    }

    pub fn try_record_fail(&mut self, suite: &str, test: &str, failures: Vec<Failure>) -> Result<(), AggregateError> {
        self.ensure_unrecorded(suite, test)?;
        let index = match self.failure_index.get(suite) {
            Some(&index) => index,
            None => {
                self.failures.push(SuiteFailures {
                    suite: suite.to_string(),
                    tests: Vec::new(),
                });
                self.failure_index.insert(suite.to_string(), self.failures.len() - 1);
                self.failures.len() - 1
            }
        };
        self.failures[index].tests.push(FailedTest {
            test: test.to_string(),
            failures,
        });
        Ok(())
    }

    fn ensure_unrecorded(&self, suite: &str, test: &str) -> Result<(), AggregateError> {
        if self.contains(suite, test) {
            return Err(AggregateError::AlreadyRecorded {
                suite: suite.to_string(),
                test: test.to_string(),
            });
        }
        Ok(())
    }

    /// Passing tests grouped by suite, in first-insertion order.
    pub fn passes(&self) -> &[SuitePasses] {
        &self.passes
    }

    /// Failed tests grouped by suite, in first-insertion order.
    pub fn failures(&self) -> &[SuiteFailures] {
        &self.failures
    }

    /// Passing test names of one suite.
    pub fn passes_of(&self, suite: &str) -> Option<&[String]> {
        self.pass_index
            .get(suite)
            .map(|&index| self.passes[index].tests.as_slice())
    }

    /// Failed tests of one suite.
    pub fn failures_of(&self, suite: &str) -> Option<&[FailedTest]> {
        self.failure_index
            .get(suite)
            .map(|&index| self.failures[index].tests.as_slice())
    }

    /// Recorded failures of one test, if it failed.
    pub fn failures_for(&self, suite: &str, test: &str) -> Option<&[Failure]> {
        self.failures_of(suite)?
            .iter()
            .find(|failed| failed.test == test)
            .map(|failed| failed.failures.as_slice())
    }

    /// Whether `suite::test` has been classified.
    pub fn contains(&self, suite: &str, test: &str) -> bool {
        let passed = self
            .passes_of(suite)
            .is_some_and(|tests| tests.iter().any(|t| t == test));
        passed || self.failures_for(suite, test).is_some()
    }

    pub fn pass_count(&self) -> usize {
        self.passes.iter().map(|suite| suite.tests.len()).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.iter().map(|suite| suite.tests.len()).sum()
    }

    pub fn total(&self) -> usize {
        self.pass_count() + self.failure_count()
    }

    /// True when no test failed (including the empty run).
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
