//! Console output (pytest-style).

use std::io::{self, Write};

use tracing::debug;

use super::{Failure, RunNotifier};
use crate::tree::Description;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
    pub ignored: usize,
}

/// Prints one status per test, then a summary line when the suite finishes.
pub struct ConsoleNotifier<W: Write = io::Stderr> {
    out: W,
    verbose: bool,
    summary: RunSummary,
    // Outcome of the running test, reported on finish
    outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Failed,
    Aborted,
}

impl ConsoleNotifier {
    pub fn new(verbose: bool) -> Self {
        Self::with_writer(io::stderr(), verbose)
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn with_writer(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            summary: RunSummary::default(),
            outcome: None,
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Console output is best effort; a closed stream must not abort the run
    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
    }
}

impl<W: Write> RunNotifier for ConsoleNotifier<W> {
    fn fire_test_suite_started(&mut self, description: &Description) {
        self.emit(&format!("\x1b[1m{}\x1b[0m\n", description.display_name()));
    }

    fn fire_test_started(&mut self, description: &Description) {
        debug!(test = %description.display_name(), "started");
        self.outcome = None;
        if self.verbose {
            self.emit(&format!("{} ... ", description.display_name()));
        }
    }

    fn fire_test_ignored(&mut self, description: &Description) {
        self.summary.ignored += 1;
        let status = if self.verbose {
            format!("{} ... \x1b[33mIGNORED\x1b[0m\n", description.display_name())
        } else {
            "\x1b[33ms\x1b[0m".to_string()
        };
        self.emit(&status);
    }

    fn fire_test_failure(&mut self, failure: &Failure<'_>) {
        // Containers never finish, so their failures are counted here
        if failure.description.is_test() {
            self.outcome = Some(Outcome::Failed);
        } else {
            self.summary.failed += 1;
        }
        let message = failure.cause.map(ToString::to_string).unwrap_or_default();
        self.emit(&format!(
            "\n\x1b[31m{}\x1b[0m\n{message}\n",
            failure.description.display_name()
        ));
    }

    fn fire_test_assumption_failed(&mut self, failure: &Failure<'_>) {
        self.outcome = Some(Outcome::Aborted);
        if self.verbose {
            if let Some(message) = failure.message() {
                self.emit(&format!("({message}) "));
            }
        }
    }

    fn fire_test_finished(&mut self, _description: &Description) {
        let status = match self.outcome.take() {
            None => {
                self.summary.passed += 1;
                if self.verbose { "\x1b[32mPASSED\x1b[0m\n" } else { "\x1b[32m.\x1b[0m" }
            }
            Some(Outcome::Failed) => {
                self.summary.failed += 1;
                if self.verbose { "\x1b[31mFAILED\x1b[0m\n" } else { "\x1b[31mF\x1b[0m" }
            }
            Some(Outcome::Aborted) => {
                self.summary.aborted += 1;
                if self.verbose { "\x1b[33mABORTED\x1b[0m\n" } else { "\x1b[33ma\x1b[0m" }
            }
        };
        self.emit(status);
    }

    fn fire_test_suite_finished(&mut self, _description: &Description) {
        let summary = self.summary;
        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("\x1b[32m{} passed\x1b[0m", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("\x1b[31m{} failed\x1b[0m", summary.failed));
        }
        if summary.aborted > 0 {
            parts.push(format!("\x1b[33m{} aborted\x1b[0m", summary.aborted));
        }
        if summary.ignored > 0 {
            parts.push(format!("\x1b[33m{} ignored\x1b[0m", summary.ignored));
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }

        let lead = if self.verbose { "" } else { "\n" };
        self.emit(&format!("{lead}====== {} ======\n", parts.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use treebridge_core::UniqueId;

    use super::*;
    use crate::notification::Cause;

    #[test]
    fn test_summary_counts_outcomes() {
        let suite = Description::suite("Suite", None);
        let pass = Description::test("pass", "Suite", UniqueId::new("pass"));
        let fail = Description::test("fail", "Suite", UniqueId::new("fail"));
        let skip = Description::test("skip", "Suite", UniqueId::new("skip"));
        let cause = Cause::new("boom");

        let mut notifier = ConsoleNotifier::with_writer(Vec::new(), false);
        notifier.fire_test_suite_started(&suite);
        notifier.fire_test_started(&pass);
        notifier.fire_test_finished(&pass);
        notifier.fire_test_started(&fail);
        notifier.fire_test_failure(&Failure::new(&fail, Some(&cause)));
        notifier.fire_test_finished(&fail);
        notifier.fire_test_ignored(&skip);
        notifier.fire_test_suite_finished(&suite);

        assert_eq!(
            notifier.summary(),
            RunSummary {
                passed: 1,
                failed: 1,
                aborted: 0,
                ignored: 1
            }
        );
        let output = String::from_utf8(notifier.into_inner()).unwrap();
        assert!(output.contains("boom"));
        assert!(output.contains("1 passed"));
        assert!(output.contains("1 failed"));
    }

    #[test]
    fn test_container_failure_counts_as_failed() {
        let suite = Description::suite("Suite", None);
        let class = Description::suite("C", Some(UniqueId::new("C")));
        let cause = Cause::new("beforeAll blew up");

        let mut notifier = ConsoleNotifier::with_writer(Vec::new(), false);
        notifier.fire_test_suite_started(&suite);
        notifier.fire_test_failure(&Failure::new(&class, Some(&cause)));
        notifier.fire_test_suite_finished(&suite);

        assert_eq!(notifier.summary().failed, 1);
        let output = String::from_utf8(notifier.into_inner()).unwrap();
        assert!(output.contains("beforeAll blew up"));
        assert!(output.contains("1 failed"));
    }

    #[test]
    fn test_empty_run_summary() {
        let suite = Description::suite("Suite", None);
        let mut notifier = ConsoleNotifier::with_writer(Vec::new(), true);
        notifier.fire_test_suite_finished(&suite);
        let output = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(output, "====== no tests ran ======\n");
    }
}
