//! Demonstration suites run by `rigor-demo`.
//!
//! A mix of passing and failing tests, sync and async bodies, and a suite with a cleanup hook, so every part of the
//! result view shows up.

use std::time::Duration;

use anyhow::{Context, bail};

use crate::suite::{Suite, SuiteDefinition};
use crate::{TestContext, TestResult};

pub struct Arithmetic {
    t: TestContext,
}

impl Suite for Arithmetic {
    const NAME: &'static str = "Arithmetic";

    fn create(t: TestContext) -> Self {
        Self { t }
    }
}

#[crate::suite]
impl Arithmetic {
    fn test_addition(&mut self) {
        self.t.compare(2 + 2, 4);
        self.t.compare(0.5 + 0.25, 0.75);
    }

    fn test_checked_overflow(&mut self) {
        self.t.compare(u8::MAX.checked_add(1), None::<u8>);
    }

    fn test_integer_division(&mut self) {
        // Fails on purpose: integer division truncates.
        self.t.compare(7 / 2, 4);
    }
}

pub struct Text {
    t: TestContext,
}

impl Suite for Text {
    const NAME: &'static str = "Text";

    fn create(t: TestContext) -> Self {
        Self { t }
    }
}

#[crate::suite]
impl Text {
    fn test_concat(&mut self) {
        self.t.compare(format!("{}-{}", "ri", "gor"), "ri-gor");
    }

    fn test_parse_number(&mut self) -> TestResult {
        let value: i32 = "42".parse()?;
        self.t.compare(value, 42);
        let value: i32 = "forty-two".parse().context("parsing a spelled-out number")?;
        self.t.compare(value, 42);
        Ok(())
    }

    fn test_uppercase(&mut self) {
        self.t.compare("straße".to_uppercase(), "STRASSE");
    }
}

/// Async suite holding a scratch buffer that cleanup releases.
pub struct Timers {
    t: TestContext,
    log: Vec<&'static str>,
}

impl Suite for Timers {
    const NAME: &'static str = "Timers";

    fn create(t: TestContext) -> Self {
        Self { t, log: Vec::new() }
    }

    fn cleanup(&mut self) -> TestResult {
        self.log.clear();
        Ok(())
    }
}

#[crate::suite]
impl Timers {
    async fn test_sleep_then_compare(&mut self) {
        self.record("before").await;
        self.record("after").await;
        self.t.compare(self.log.as_slice(), ["before", "after"].as_slice());
    }

    async fn test_deadline_missed(&mut self) -> TestResult {
        let started = tokio::time::Instant::now();
        tokio::time::sleep(Duration::from_millis(30)).await;
        if started.elapsed() > Duration::from_millis(10) {
            bail!("operation took {:?}, budget was 10ms", started.elapsed());
        }
        Ok(())
    }

    async fn record(&mut self, entry: &'static str) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.log.push(entry);
    }
}

/// The demonstration suites, in run order.
pub fn suites() -> Vec<SuiteDefinition> {
    crate::suites![Arithmetic, Text, Timers]
}
