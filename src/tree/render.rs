//! Plain-text rendering of a description tree.

use std::fmt::Write;

use super::{DescriptionId, DescriptionTree};

const INDENT: &str = "  ";

impl DescriptionTree {
    /// Render the attached descriptions, one per line, indented by depth.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, self.suite(), 0);
        out
    }

    fn render_into(&self, out: &mut String, id: DescriptionId, depth: usize) {
        let description = self.get(id);
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}{}", INDENT.repeat(depth), description.display_name());
        for &child in description.children() {
            self.render_into(out, child, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use treebridge_core::TestIdentifier;

    use crate::config::RunConfig;
    use crate::plan::TestPlan;
    use crate::tree::{DescriptionLayout, DescriptionTree};

    fn plan() -> TestPlan {
        TestPlan::from_identifiers([
            TestIdentifier::container("[engine:e]", "JUnit Jupiter"),
            TestIdentifier::container("[engine:e]/[class:Calc]", "Calc"),
            TestIdentifier::test("[engine:e]/[class:Calc]/[method:adds()]", "adds()"),
            TestIdentifier::container("[engine:e]/[class:Calc]/[test-template:sums(int)]", "sums(int)"),
            TestIdentifier::test(
                "[engine:e]/[class:Calc]/[test-template:sums(int)]/[test-template-invocation:#1]",
                "[1] 1",
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_nested() {
        let tree = DescriptionTree::build_suite(plan(), "Calculator", &RunConfig::default()).unwrap();
        insta::assert_snapshot!(tree.render().trim_end(), @r"
        Calculator
          JUnit Jupiter
            Calc
              adds(Calc)
              sums[int]
                sums[int]: [1] 1(Calc)
        ");
    }

    #[test]
    fn test_render_folded() {
        let config = RunConfig::new().with_layout(DescriptionLayout::Folded);
        let tree = DescriptionTree::build_suite(plan(), "Calculator", &config).unwrap();
        insta::assert_snapshot!(tree.render().trim_end(), @r"
        Calculator
          adds(Calc)
          sums[int]
            sums[int]: [1] 1(Calc)
        ");
    }
}
