//! Registration generated by `#[rigor::suite]`

use rigor::{RegisterTests, Suite, SuiteDefinition, TestContext, TestResult};

struct Registry {
    t: TestContext,
    calls: u32,
}

impl Suite for Registry {
    const NAME: &'static str = "Registry";

    fn create(t: TestContext) -> Self {
        Self { t, calls: 0 }
    }
}

#[rigor::suite]
impl Registry {
    fn test_zulu(&mut self) {
        self.calls += 1;
        self.t.compare(self.calls, 1);
    }

    fn helper(&self) -> u32 {
        self.calls * 2
    }

    async fn test_alpha(&mut self) -> TestResult {
        tokio::task::yield_now().await;
        self.t.compare(self.helper(), 0);
        Ok(())
    }

    fn test_shared_ref(&self) {
        self.t.compare(self.calls, 0);
    }

    fn test_returns_io_result(&mut self) -> Result<(), std::io::Error> {
        Ok(())
    }

    #[allow(dead_code)]
    fn setup_like_but_not_a_test(&mut self) {}
}

#[test]
fn test_registers_prefixed_methods_in_declaration_order() {
    let names: Vec<&str> = Registry::tests().iter().map(|case| case.name).collect();
    assert_eq!(
        names,
        ["test_zulu", "test_alpha", "test_shared_ref", "test_returns_io_result"]
    );
}

#[test]
fn test_async_methods_are_registered_as_async() {
    let flags: Vec<bool> = Registry::tests().iter().map(|case| case.is_async()).collect();
    assert_eq!(flags, [false, true, false, false]);
}

#[test]
fn test_definition_mirrors_registration() {
    let definition = SuiteDefinition::of::<Registry>();
    assert_eq!(definition.name(), "Registry");
    assert_eq!(definition.test_names().len(), 4);
}

#[test]
fn test_generated_bodies_run() {
    let report = rigor::Harness::new(rigor::HarnessConfig::new().with_log_results(false))
        .frame_clock(rigor::ManualFrameClock::new())
        .run_blocking(&rigor::suites![Registry], rigor::BufferSurface::new())
        .unwrap();
    assert!(report.is_success(), "{:?}", report.aggregate.failures());
    assert_eq!(report.summary.passed, 4);
}
