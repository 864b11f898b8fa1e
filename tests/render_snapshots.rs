//! Golden snapshot tests for rendered results
//!
//! Review changes: `cargo insta review`

use rigor::presenter::format_log;
use rigor::{Failure, ResultTree, RunAggregate, Theme};

fn sample_aggregate() -> RunAggregate {
    let mut aggregate = RunAggregate::new();
    aggregate.record_pass("Arithmetic", "test_addition");
    aggregate.record_fail(
        "Arithmetic",
        "test_integer_division",
        vec![Failure::Mismatch {
            actual: "3".to_string(),
            expected: "4".to_string(),
            location: "src/math.rs:14:16".to_string(),
        }],
    );
    aggregate.record_pass("Arithmetic", "test_checked_overflow");
    aggregate.record_fail(
        "Network",
        "test_fetch",
        vec![
            Failure::Mismatch {
                actual: "\"partial\"".to_string(),
                expected: "\"complete\"".to_string(),
                location: "src/net.rs:30:9".to_string(),
            },
            Failure::Error {
                message: "connection reset".to_string(),
                stack: None,
            },
            Failure::Cleanup {
                message: "socket already closed".to_string(),
                stack: None,
            },
        ],
    );
    aggregate.record_pass("Text", "test_concat");
    aggregate
}

#[test]
fn test_result_tree_plain() {
    let rendered = ResultTree::build(&sample_aggregate()).render(&Theme::plain());
    insta::assert_snapshot!("result_tree_plain", rendered);
}

#[test]
fn test_results_log_dump() {
    let dump = format_log(&sample_aggregate()).join("\n");
    insta::assert_snapshot!("results_log_dump", dump);
}
