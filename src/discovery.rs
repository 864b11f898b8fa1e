//! Test discovery.
//!
//! Walks an ordered collection of [`SuiteDefinition`]s and yields the tests to run: suites in the given order, and
//! within each suite the registered tests whose names the [`TestDiscovery`] strategy accepts, in registration
//! order. The result is a lazy, single-pass iterator; running it twice over the same suites yields the same
//! sequence.

use crate::suite::SuiteDefinition;

/// Prefix a method name must carry to count as a test.
pub const TEST_PREFIX: &str = "test";

/// Decides which registered names are tests.
pub trait TestDiscovery {
    fn is_test(&self, name: &str) -> bool;
}

/// Accepts names starting with a fixed prefix (`test` by default).
#[derive(Debug, Clone)]
pub struct PrefixDiscovery {
    prefix: &'static str,
}

impl PrefixDiscovery {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }
}

impl Default for PrefixDiscovery {
    fn default() -> Self {
        Self::new(TEST_PREFIX)
    }
}

impl TestDiscovery for PrefixDiscovery {
    fn is_test(&self, name: &str) -> bool {
        name.starts_with(self.prefix)
    }
}

/// One test found by discovery.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveredTest<'a> {
    pub suite: &'a SuiteDefinition,
    /// Position of the suite in the run's suite list.
    pub suite_index: usize,
    /// Position of the test in the suite's registration list.
    pub test_index: usize,
    pub name: &'static str,
}

impl DiscoveredTest<'_> {
    pub fn suite_name(&self) -> &str {
        self.suite.name()
    }
}

/// Lazily enumerate the tests of `suites`, in order.
pub fn discover<'a, D>(discovery: &'a D, suites: &'a [SuiteDefinition]) -> impl Iterator<Item = DiscoveredTest<'a>> + 'a
where
    D: TestDiscovery + ?Sized + 'a,
{
    suites.iter().enumerate().flat_map(move |(suite_index, suite)| {
        suite
            .test_names()
            .iter()
            .enumerate()
            .filter(move |(_, name)| discovery.is_test(name))
            .map(move |(test_index, &name)| DiscoveredTest {
                suite,
                suite_index,
                test_index,
                name,
            })
    })
}
