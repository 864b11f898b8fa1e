//! Diagnostic log dump, emitted once after a run.

use rigor_core::RunAggregate;
use tracing::info;

/// Target of the results dump events.
pub const RESULTS_TARGET: &str = "rigor::results";

/// The dump as text lines: summary counts, then per suite, per test, per failure trace line.
pub fn format_log(aggregate: &RunAggregate) -> Vec<String> {
    let mut lines = vec!["Test results:".to_string()];

    lines.push(format!("Passes ({}):", aggregate.pass_count()));
    for suite in aggregate.passes() {
        lines.push(format!("  {}", suite.suite));
        for test in &suite.tests {
            lines.push(format!("    {test}"));
        }
    }

    lines.push(format!("Failures ({}):", aggregate.failure_count()));
    for suite in aggregate.failures() {
        lines.push(format!("  {}", suite.suite));
        for failed in &suite.tests {
            lines.push(format!("    {}", failed.test));
            for failure in &failed.failures {
                for line in failure.trace().lines() {
                    lines.push(format!("      {line}"));
                }
            }
        }
    }

    lines
}

/// Emit the dump as `info` events. The two count lines carry the structured mappings as JSON fields.
pub fn log_results(aggregate: &RunAggregate) {
    let passes = serde_json::to_string(aggregate.passes()).unwrap_or_default();
    let failures = serde_json::to_string(aggregate.failures()).unwrap_or_default();

    for line in format_log(aggregate) {
        if line.starts_with("Passes (") {
            info!(target: RESULTS_TARGET, passes = %passes, "{line}");
        } else if line.starts_with("Failures (") {
            info!(target: RESULTS_TARGET, failures = %failures, "{line}");
        } else {
            info!(target: RESULTS_TARGET, "{line}");
        }
    }
}
