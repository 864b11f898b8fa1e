//! The suite contract and type-erased suite definitions.
//!
//! A suite is a Rust type implementing [`Suite`] (name, construction, cleanup) and [`RegisterTests`] (the list of
//! `(name, body)` pairs, usually generated by `#[rigor::suite]`). [`SuiteDefinition::of`] erases the type so suites
//! of different types can be run in one ordered collection.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use anyhow::anyhow;
use rigor_core::{TestContext, TestError, TestResult};

/// Deferred completion of an async test body.
pub type TestFuture<'a> = Pin<Box<dyn Future<Output = TestResult> + 'a>>;

/// A group of related tests, instantiated fresh for every test.
pub trait Suite: RegisterTests + Sized + 'static {
    /// Suite name. Suites sharing a name share one entry in the run aggregate.
    const NAME: &'static str;

    /// Create a fresh instance bound to the test's assertion context.
    fn create(ctx: TestContext) -> Self;

    /// Release per-test resources. Runs exactly once per test, after the body settles.
    fn cleanup(&mut self) -> TestResult {
        Ok(())
    }
}

/// Explicit test registration, generated by `#[rigor::suite]` or written by hand.
pub trait RegisterTests: Sized {
    /// The suite's tests, in the order they should run.
    fn tests() -> Vec<TestCase<Self>>;
}

/// Body of one test.
pub enum TestBody<S> {
    Sync(fn(&mut S) -> TestResult),
    Async(for<'a> fn(&'a mut S) -> TestFuture<'a>),
}

impl<S> Clone for TestBody<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for TestBody<S> {}

/// A named test body.
pub struct TestCase<S> {
    pub name: &'static str,
    pub body: TestBody<S>,
}

impl<S> TestCase<S> {
    pub fn sync(name: &'static str, body: fn(&mut S) -> TestResult) -> Self {
        Self {
            name,
            body: TestBody::Sync(body),
        }
    }

    pub fn asynchronous(name: &'static str, body: for<'a> fn(&'a mut S) -> TestFuture<'a>) -> Self {
        Self {
            name,
            body: TestBody::Async(body),
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self.body, TestBody::Async(_))
    }
}

/// Conversion of a test method's return value into a [`TestResult`].
pub trait IntoTestResult {
    fn into_test_result(self) -> TestResult;
}

impl IntoTestResult for () {
    fn into_test_result(self) -> TestResult {
        Ok(())
    }
}

impl<E> IntoTestResult for Result<(), E>
where
    E: Into<TestError>,
{
    fn into_test_result(self) -> TestResult {
        self.map_err(Into::into)
    }
}

/// A live suite instance, as seen by the execution engine.
pub(crate) trait SuiteInstance {
    /// Future running test `index`. The body is only called when the future is first polled.
    fn invoke(&mut self, index: usize) -> TestFuture<'_>;

    fn cleanup(&mut self) -> TestResult;
}

struct Instance<S: Suite> {
    suite: S,
    cases: Rc<[TestCase<S>]>,
}

impl<S: Suite> SuiteInstance for Instance<S> {
    fn invoke(&mut self, index: usize) -> TestFuture<'_> {
        let Some(case) = self.cases.get(index) else {
            return Box::pin(async move { Err(anyhow!("no test registered at index {index}")) });
        };
        let suite = &mut self.suite;
        match case.body {
            TestBody::Sync(body) => Box::pin(async move { body(suite) }),
            TestBody::Async(body) => Box::pin(async move { body(suite).await }),
        }
    }

    fn cleanup(&mut self) -> TestResult {
        self.suite.cleanup()
    }
}

type Factory = dyn Fn(TestContext) -> Box<dyn SuiteInstance>;

/// A type-erased suite: its name, its registered test names and a factory for fresh instances.
#[derive(Clone)]
pub struct SuiteDefinition {
    name: String,
    tests: Vec<&'static str>,
    factory: Rc<Factory>,
}

impl SuiteDefinition {
    /// Erase suite type `S`.
    pub fn of<S: Suite>() -> Self {
        let cases: Rc<[TestCase<S>]> = S::tests().into();
        let tests = cases.iter().map(|case| case.name).collect();
        let factory = move |ctx: TestContext| -> Box<dyn SuiteInstance> {
            Box::new(Instance {
                suite: S::create(ctx),
                cases: Rc::clone(&cases),
            })
        };
        Self {
            name: S::NAME.to_string(),
            tests,
            factory: Rc::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered test names, in registration order (before prefix filtering).
    pub fn test_names(&self) -> &[&'static str] {
        &self.tests
    }

    pub(crate) fn instantiate(&self, ctx: TestContext) -> Box<dyn SuiteInstance> {
        (self.factory)(ctx)
    }
}

impl fmt::Debug for SuiteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteDefinition")
            .field("name", &self.name)
            .field("tests", &self.tests)
            .finish_non_exhaustive()
    }
}

/// Build a `Vec<SuiteDefinition>` from suite types, in order.
///
/// ```ignore
/// let suites = rigor::suites![MathSuite, NetworkSuite];
/// ```
#[macro_export]
macro_rules! suites {
    ($($suite:ty),* $(,)?) => {
        ::std::vec![$($crate::SuiteDefinition::of::<$suite>()),*]
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Counter {
        t: TestContext,
        value: i32,
    }

    impl Suite for Counter {
        const NAME: &'static str = "Counter";

        fn create(t: TestContext) -> Self {
            Self { t, value: 0 }
        }
    }

    impl RegisterTests for Counter {
        fn tests() -> Vec<TestCase<Self>> {
            vec![
                TestCase::sync("test_increment", |s| {
                    s.value += 1;
                    s.t.compare(s.value, 1);
                    Ok(())
                }),
                TestCase::asynchronous("test_async", Counter::test_async),
            ]
        }
    }

    impl Counter {
        fn test_async(&mut self) -> TestFuture<'_> {
            Box::pin(async move {
                self.t.compare(self.value, 0);
                Ok(())
            })
        }
    }

    #[test]
    fn test_definition_lists_registered_names() {
        let def = SuiteDefinition::of::<Counter>();
        assert_eq!(def.name(), "Counter");
        assert_eq!(def.test_names(), ["test_increment", "test_async"]);
    }

    #[test]
    fn test_each_instance_is_fresh() {
        let def = SuiteDefinition::of::<Counter>();
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();

        for _ in 0..2 {
            let ctx = TestContext::new();
            let mut instance = def.instantiate(ctx.clone());
            rt.block_on(instance.invoke(0)).unwrap();
            assert!(ctx.is_clean(), "state leaked between instances: {:?}", ctx.failures());
        }
    }

    #[test]
    fn test_unknown_index_is_an_error() {
        let def = SuiteDefinition::of::<Counter>();
        let mut instance = def.instantiate(TestContext::new());
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let err = rt.block_on(instance.invoke(7)).unwrap_err();
        assert_eq!(err.to_string(), "no test registered at index 7");
    }

    #[test]
    fn test_into_test_result() {
        assert!(().into_test_result().is_ok());
        let failing: Result<(), std::io::Error> = Err(std::io::Error::other("disk full"));
        assert_eq!(failing.into_test_result().unwrap_err().to_string(), "disk full");
    }
}
