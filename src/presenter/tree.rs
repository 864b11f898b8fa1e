//! Result tree construction and rendering.
//!
//! A snapshot of the run aggregate becomes a small node tree:
//!
//! ```text
//! results
//! ├── heading   "Test results"
//! ├── section   "Failures (n)"      [fail]
//! ├── suite     <name>              [suite, fail]
//! │   └── test  <name>              [test]
//! │       └── trace <failure trace> [error]
//! ├── section   "Passes (n)"        [pass]
//! └── suite     <name>              [suite, pass]
//!     └── test  <name>              [test]
//! ```
//!
//! Rendering walks the tree depth first. A node's tone comes from its own classes, falling back to its parent's,
//! and its indentation comes from its role.

use rigor_core::RunAggregate;

use super::theme::{Theme, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Container,
    Heading,
    Section,
    Line,
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Results,
    Suite,
    Test,
    Error,
    Fail,
    Pass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: Tag,
    pub classes: Vec<Class>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: Tag, classes: &[Class], text: Option<String>, children: Vec<Node>) -> Self {
        Self {
            tag,
            classes: classes.to_vec(),
            text,
            children,
        }
    }

    pub fn has_class(&self, class: Class) -> bool {
        self.classes.contains(&class)
    }

    fn tone(&self) -> Option<Tone> {
        if self.has_class(Class::Error) {
            Some(Tone::Error)
        } else if self.has_class(Class::Fail) {
            Some(Tone::Fail)
        } else if self.has_class(Class::Pass) {
            Some(Tone::Pass)
        } else if self.tag == Tag::Heading {
            Some(Tone::Heading)
        } else {
            None
        }
    }

    fn level(&self) -> usize {
        if self.has_class(Class::Error) {
            3
        } else if self.has_class(Class::Test) {
            2
        } else if self.has_class(Class::Suite) {
            1
        } else {
            0
        }
    }
}

/// Rendered view of one aggregate snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTree {
    root: Node,
}

impl ResultTree {
    pub fn build(aggregate: &RunAggregate) -> Self {
        let mut children = vec![
            Node::new(Tag::Heading, &[], Some("Test results".to_string()), Vec::new()),
            Node::new(
                Tag::Section,
                &[Class::Fail],
                Some(format!("Failures ({})", aggregate.failure_count())),
                Vec::new(),
            ),
        ];

        children.extend(aggregate.failures().iter().map(|suite| {
            let tests = suite
                .tests
                .iter()
                .map(|failed| {
                    let traces = failed
                        .failures
                        .iter()
                        .map(|failure| Node::new(Tag::Trace, &[Class::Error], Some(failure.trace()), Vec::new()))
                        .collect();
                    Node::new(Tag::Line, &[Class::Test], Some(failed.test.clone()), traces)
                })
                .collect();
            Node::new(Tag::Line, &[Class::Suite, Class::Fail], Some(suite.suite.clone()), tests)
        }));

        children.push(Node::new(
            Tag::Section,
            &[Class::Pass],
            Some(format!("Passes ({})", aggregate.pass_count())),
            Vec::new(),
        ));

        children.extend(aggregate.passes().iter().map(|suite| {
            let tests = suite
                .tests
                .iter()
                .map(|test| Node::new(Tag::Line, &[Class::Test], Some(test.clone()), Vec::new()))
                .collect();
            Node::new(Tag::Line, &[Class::Suite, Class::Pass], Some(suite.suite.clone()), tests)
        }));

        Self {
            root: Node::new(Tag::Container, &[Class::Results], None, children),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Render to text, one line per node line, each terminated by `\n`.
    pub fn render(&self, theme: &Theme) -> String {
        let mut out = String::new();
        render_node(&self.root, None, theme, &mut out);
        out
    }
}

fn render_node(node: &Node, inherited: Option<Tone>, theme: &Theme, out: &mut String) {
    let tone = node.tone().or(inherited);
    if let Some(text) = &node.text {
        let indent = theme.indent(node.level());
        let bold = node.tag == Tag::Section;
        for line in text.lines() {
            out.push_str(&indent);
            out.push_str(&theme.paint(line, tone, bold));
            out.push('\n');
        }
    }
    for child in &node.children {
        render_node(child, tone, theme, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigor_core::Failure;

    fn mismatch(actual: &str, expected: &str) -> Failure {
        Failure::Mismatch {
            actual: actual.to_string(),
            expected: expected.to_string(),
            location: "tests/math.rs:12:9".to_string(),
        }
    }

    #[test]
    fn test_empty_run_renders_headings_only() {
        let tree = ResultTree::build(&RunAggregate::new());
        assert_eq!(
            tree.render(&Theme::plain()),
            "Test results\nFailures (0)\nPasses (0)\n"
        );
    }

    #[test]
    fn test_failures_come_before_passes() {
        let mut aggregate = RunAggregate::new();
        aggregate.record_pass("Math", "test_add");
        aggregate.record_fail("Math", "test_sub", vec![mismatch("1", "2")]);

        let rendered = ResultTree::build(&aggregate).render(&Theme::plain());
        let failures = rendered.find("Failures (1)").unwrap_or(usize::MAX);
        let passes = rendered.find("Passes (1)").unwrap_or(0);
        assert!(failures < passes, "{rendered}");
    }

    #[test]
    fn test_traces_inherit_error_tone_and_tests_inherit_suite_tone() {
        let mut aggregate = RunAggregate::new();
        aggregate.record_fail("Math", "test_sub", vec![mismatch("1", "2")]);
        aggregate.record_pass("Strings", "test_concat");

        let rendered = ResultTree::build(&aggregate).render(&Theme::ansi());
        assert!(rendered.contains("    \x1b[31mtest_sub\x1b[0m\n"));
        assert!(rendered.contains("      \x1b[90mExpected 1 to equal 2\x1b[0m\n"));
        assert!(rendered.contains("    \x1b[92mtest_concat\x1b[0m\n"));
    }

    #[test]
    fn test_tree_shape() {
        let mut aggregate = RunAggregate::new();
        aggregate.record_fail("Math", "test_sub", vec![mismatch("1", "2"), mismatch("3", "4")]);

        let tree = ResultTree::build(&aggregate);
        let suites: Vec<&Node> = tree
            .root()
            .children
            .iter()
            .filter(|node| node.has_class(Class::Suite))
            .collect();
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].children.len(), 1);
        assert_eq!(suites[0].children[0].children.len(), 2);
    }
}
