//! Per-test assertion context.
//!
//! The engine creates one [`TestContext`] per test invocation and hands a clone of it to the fresh suite instance.
//! Clones share the same failure list, so everything the suite records through its handle is visible to the engine
//! when it classifies the test. The handle is `!Send`: a run is single-threaded.

use std::cell::RefCell;
use std::fmt::Debug;
use std::panic::Location;
use std::rc::Rc;

use crate::failure::Failure;

/// Accumulates recorded failures for one test.
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    failures: Rc<RefCell<Vec<Failure>>>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mismatch if `actual != expected`.
    ///
    /// Never panics and never stops the test; the mismatch is attributed to the caller's location. Equality is
    /// whatever `PartialEq` says it is for the compared types.
    #[track_caller]
    pub fn compare<A, E>(&self, actual: A, expected: E)
    where
        A: PartialEq<E> + Debug,
        E: Debug,
    {
        if actual != expected {
            self.record(Failure::mismatch(&actual, &expected, Location::caller()));
        }
    }

    /// Append a failure.
    pub fn record(&self, failure: Failure) {
        self.failures.borrow_mut().push(failure);
    }

    /// Number of failures recorded so far.
    pub fn failure_count(&self) -> usize {
        self.failures.borrow().len()
    }

    /// True while no failure has been recorded.
    pub fn is_clean(&self) -> bool {
        self.failures.borrow().is_empty()
    }

    /// Copy of the failures recorded so far, in recording order.
    pub fn failures(&self) -> Vec<Failure> {
        self.failures.borrow().clone()
    }

    /// Move the recorded failures out, leaving the context empty.
    pub fn take_failures(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.failures.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_values_record_nothing() {
        let ctx = TestContext::new();
        ctx.compare(1, 1);
        ctx.compare("same", "same");
        ctx.compare(String::from("owned"), "owned");
        assert!(ctx.is_clean());
    }

    #[test]
    fn test_each_mismatch_is_recorded_in_order() {
        let ctx = TestContext::new();
        ctx.compare(1, 2);
        ctx.compare(3, 3);
        ctx.compare("a", "b");

        let failures = ctx.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].to_string(), "Expected 1 to equal 2");
        assert_eq!(failures[1].to_string(), r#"Expected "a" to equal "b""#);
    }

    #[test]
    fn test_mismatch_location_points_at_caller() {
        let ctx = TestContext::new();
        ctx.compare(true, false);
        match &ctx.failures()[0] {
            Failure::Mismatch { location, .. } => assert!(location.contains("context.rs"), "{location}"),
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_clones_share_failures() {
        let ctx = TestContext::new();
        let handle = ctx.clone();
        handle.compare(1, 2);
        assert_eq!(ctx.failure_count(), 1);

        let taken = ctx.take_failures();
        assert_eq!(taken.len(), 1);
        assert!(handle.is_clean());
    }
}
