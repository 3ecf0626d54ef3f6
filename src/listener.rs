//! Event correlation.
//!
//! [`ProjectionListener`] receives the platform's execution events and turns them into legacy notifications on
//! the descriptions projected for the same unique IDs. It tracks every identifier through
//!
//! ```text
//! NotStarted -> Started -> Skipped | Finished
//! ```
//!
//! (a skip may also arrive without a start). Events that break this order are logged and still forwarded: the
//! legacy runner is a reporting sink, and dropping events would hide results. Events for unknown unique IDs are
//! errors, because every one of them points at a registration that went missing.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};
use treebridge_core::{TestIdentifier, UniqueId};

use crate::error::ProjectionResult;
use crate::notification::{Cause, Failure, RunNotifier};
use crate::plan::PlanQueries;
use crate::tree::{DescriptionId, DescriptionTree};

/// Outcome of a finished node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestExecutionResult {
    Successful,
    /// Aborted, typically by a failed assumption.
    Aborted(Option<Cause>),
    Failed(Option<Cause>),
}

impl TestExecutionResult {
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            TestExecutionResult::Successful => None,
            TestExecutionResult::Aborted(cause) | TestExecutionResult::Failed(cause) => cause.as_ref(),
        }
    }
}

/// Execution events of the platform.
///
/// Every method fails with a projection error when the event cannot be correlated; the run must stop then.
pub trait ExecutionListener {
    fn test_plan_execution_started(&mut self) -> ProjectionResult<()> {
        Ok(())
    }

    fn test_plan_execution_finished(&mut self) -> ProjectionResult<()> {
        Ok(())
    }

    /// A node was generated during execution. Arrives before any lifecycle event of that node.
    fn dynamic_test_registered(&mut self, identifier: TestIdentifier) -> ProjectionResult<()>;

    fn execution_started(&mut self, unique_id: &UniqueId) -> ProjectionResult<()>;

    fn execution_skipped(&mut self, unique_id: &UniqueId, reason: &str) -> ProjectionResult<()>;

    fn execution_finished(&mut self, unique_id: &UniqueId, result: &TestExecutionResult) -> ProjectionResult<()>;

    fn reporting_entry_published(
        &mut self,
        _unique_id: &UniqueId,
        _entries: &BTreeMap<String, String>,
    ) -> ProjectionResult<()> {
        Ok(())
    }
}

/// One execution event, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    PlanStarted,
    PlanFinished,
    DynamicTestRegistered(TestIdentifier),
    Started(UniqueId),
    Skipped {
        unique_id: UniqueId,
        reason: String,
    },
    Finished {
        unique_id: UniqueId,
        result: TestExecutionResult,
    },
    ReportingEntryPublished {
        unique_id: UniqueId,
        entries: BTreeMap<String, String>,
    },
}

impl ExecutionEvent {
    /// Deliver this event to `listener`.
    pub fn dispatch<L: ExecutionListener + ?Sized>(self, listener: &mut L) -> ProjectionResult<()> {
        match self {
            ExecutionEvent::PlanStarted => listener.test_plan_execution_started(),
            ExecutionEvent::PlanFinished => listener.test_plan_execution_finished(),
            ExecutionEvent::DynamicTestRegistered(identifier) => listener.dynamic_test_registered(identifier),
            ExecutionEvent::Started(unique_id) => listener.execution_started(&unique_id),
            ExecutionEvent::Skipped { unique_id, reason } => listener.execution_skipped(&unique_id, &reason),
            ExecutionEvent::Finished { unique_id, result } => listener.execution_finished(&unique_id, &result),
            ExecutionEvent::ReportingEntryPublished { unique_id, entries } => {
                listener.reporting_entry_published(&unique_id, &entries)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Started,
    Skipped,
    Finished,
}

/// Correlates execution events with a [`DescriptionTree`] and drives a [`RunNotifier`].
pub struct ProjectionListener<'t, N: RunNotifier> {
    tree: &'t mut DescriptionTree,
    notifier: N,
    states: HashMap<UniqueId, ExecutionState>,
}

impl<'t, N: RunNotifier> ProjectionListener<'t, N> {
    pub fn new(tree: &'t mut DescriptionTree, notifier: N) -> Self {
        Self {
            tree,
            notifier,
            states: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &DescriptionTree {
        self.tree
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn into_notifier(self) -> N {
        self.notifier
    }

    /// Current state; `None` while the node has not started.
    pub fn state_of(&self, unique_id: &UniqueId) -> Option<ExecutionState> {
        self.states.get(unique_id).copied()
    }

    fn transition(&mut self, unique_id: &UniqueId, next: ExecutionState) {
        let previous = self.states.insert(unique_id.clone(), next);
        let valid = matches!(
            (previous, next),
            (None, ExecutionState::Started)
                | (None, ExecutionState::Skipped)
                | (Some(ExecutionState::Started), ExecutionState::Skipped)
                | (Some(ExecutionState::Started), ExecutionState::Finished)
        );
        if !valid {
            warn!(unique_id = %unique_id, ?previous, ?next, "execution event out of order");
        }
    }

    fn lookup(&self, unique_id: &UniqueId) -> ProjectionResult<(DescriptionId, bool)> {
        let description = self.tree.description_for(unique_id)?;
        let is_test = self.tree.plan().identifier(unique_id)?.is_test();
        Ok((description, is_test))
    }

    fn ignore(&mut self, unique_id: &UniqueId, description: DescriptionId) {
        self.transition(unique_id, ExecutionState::Skipped);
        self.notifier.fire_test_ignored(self.tree.get(description));
    }
}

impl<N: RunNotifier> ExecutionListener for ProjectionListener<'_, N> {
    fn test_plan_execution_started(&mut self) -> ProjectionResult<()> {
        self.notifier.fire_test_suite_started(self.tree.suite_description());
        Ok(())
    }

    fn test_plan_execution_finished(&mut self) -> ProjectionResult<()> {
        self.notifier.fire_test_suite_finished(self.tree.suite_description());
        Ok(())
    }

    fn dynamic_test_registered(&mut self, identifier: TestIdentifier) -> ProjectionResult<()> {
        self.tree.add_dynamic(identifier)?;
        Ok(())
    }

    fn execution_started(&mut self, unique_id: &UniqueId) -> ProjectionResult<()> {
        let (description, is_test) = self.lookup(unique_id)?;
        self.transition(unique_id, ExecutionState::Started);
        if is_test {
            self.notifier.fire_test_started(self.tree.get(description));
        }
        Ok(())
    }

    fn execution_skipped(&mut self, unique_id: &UniqueId, reason: &str) -> ProjectionResult<()> {
        let (description, is_test) = self.lookup(unique_id)?;
        warn!(
            "{} is ignored. {reason}",
            self.tree.get(description).display_name()
        );

        if is_test {
            self.ignore(unique_id, description);
            return Ok(());
        }

        self.transition(unique_id, ExecutionState::Skipped);
        let skipped_tests: Vec<UniqueId> = self
            .tree
            .plan()
            .descendants_of(unique_id)
            .into_iter()
            .filter(|d| d.is_test())
            .map(|d| d.unique_id().clone())
            .collect();
        for test in &skipped_tests {
            let description = self.tree.description_for(test)?;
            self.ignore(test, description);
        }
        Ok(())
    }

    fn execution_finished(&mut self, unique_id: &UniqueId, result: &TestExecutionResult) -> ProjectionResult<()> {
        let (description, is_test) = self.lookup(unique_id)?;
        self.transition(unique_id, ExecutionState::Finished);

        let description = self.tree.get(description);
        match result {
            TestExecutionResult::Successful => {}
            TestExecutionResult::Aborted(cause) => {
                self.notifier
                    .fire_test_assumption_failed(&Failure::new(description, cause.as_ref()));
            }
            TestExecutionResult::Failed(cause) => {
                self.notifier.fire_test_failure(&Failure::new(description, cause.as_ref()));
            }
        }
        if is_test {
            self.notifier.fire_test_finished(description);
        }
        Ok(())
    }

    fn reporting_entry_published(
        &mut self,
        unique_id: &UniqueId,
        entries: &BTreeMap<String, String>,
    ) -> ProjectionResult<()> {
        self.tree.description_for(unique_id)?;
        debug!(unique_id = %unique_id, ?entries, "reporting entry published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::error::ProjectionError;
    use crate::notification::RecordingNotifier;
    use crate::plan::TestPlan;

    fn suite_tree() -> DescriptionTree {
        let plan = TestPlan::from_identifiers([
            TestIdentifier::container("Suite", "Suite"),
            TestIdentifier::test("case1", "case1").with_parent(Some("Suite".into())),
            TestIdentifier::container("Nested", "Nested").with_parent(Some("Suite".into())),
            TestIdentifier::test("case2", "case2").with_parent(Some("Nested".into())),
            TestIdentifier::test("case3", "case3").with_parent(Some("Nested".into())),
        ])
        .unwrap();
        DescriptionTree::build_suite(plan, "root", &RunConfig::default()).unwrap()
    }

    fn replay(tree: &mut DescriptionTree, events: Vec<ExecutionEvent>) -> ProjectionResult<Vec<String>> {
        let mut listener = ProjectionListener::new(tree, RecordingNotifier::new());
        for event in events {
            event.dispatch(&mut listener)?;
        }
        Ok(listener.into_notifier().log())
    }

    #[test]
    fn test_passing_test_fires_started_and_finished() {
        let mut tree = suite_tree();
        let log = replay(
            &mut tree,
            vec![
                ExecutionEvent::Started("case1".into()),
                ExecutionEvent::Finished {
                    unique_id: "case1".into(),
                    result: TestExecutionResult::Successful,
                },
            ],
        )
        .unwrap();
        assert_eq!(log, vec!["started case1(Suite)", "finished case1(Suite)"]);
    }

    #[test]
    fn test_container_events_fire_nothing() {
        let mut tree = suite_tree();
        let log = replay(
            &mut tree,
            vec![
                ExecutionEvent::Started("Suite".into()),
                ExecutionEvent::Finished {
                    unique_id: "Suite".into(),
                    result: TestExecutionResult::Successful,
                },
            ],
        )
        .unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_skipped_container_ignores_each_test_below() {
        let mut tree = suite_tree();
        let log = replay(
            &mut tree,
            vec![ExecutionEvent::Skipped {
                unique_id: "Suite".into(),
                reason: "disabled".into(),
            }],
        )
        .unwrap();
        assert_eq!(
            log,
            vec!["ignored case1(Suite)", "ignored case2(Nested)", "ignored case3(Nested)"]
        );
    }

    #[test]
    fn test_failure_and_abort_carry_cause() {
        let mut tree = suite_tree();
        let log = replay(
            &mut tree,
            vec![
                ExecutionEvent::Started("case2".into()),
                ExecutionEvent::Finished {
                    unique_id: "case2".into(),
                    result: TestExecutionResult::Failed(Some(Cause::new("expected 4"))),
                },
                ExecutionEvent::Started("case3".into()),
                ExecutionEvent::Finished {
                    unique_id: "case3".into(),
                    result: TestExecutionResult::Aborted(Some(Cause::new("not on CI"))),
                },
            ],
        )
        .unwrap();
        assert_eq!(
            log,
            vec![
                "started case2(Nested)",
                "failure case2(Nested) (expected 4)",
                "finished case2(Nested)",
                "started case3(Nested)",
                "assumption failed case3(Nested) (not on CI)",
                "finished case3(Nested)",
            ]
        );
    }

    #[test]
    fn test_failed_container_reports_failure_without_finish() {
        let mut tree = suite_tree();
        let log = replay(
            &mut tree,
            vec![
                ExecutionEvent::Started("Nested".into()),
                ExecutionEvent::Finished {
                    unique_id: "Nested".into(),
                    result: TestExecutionResult::Failed(Some(Cause::new("setup failed"))),
                },
            ],
        )
        .unwrap();
        assert_eq!(log, vec!["failure Nested (setup failed)"]);
    }

    #[test]
    fn test_dynamic_registration_precedes_lifecycle() {
        let mut tree = suite_tree();
        let log = replay(
            &mut tree,
            vec![
                ExecutionEvent::DynamicTestRegistered(
                    TestIdentifier::test("dyn1", "dyn1").with_parent(Some("Suite".into())),
                ),
                ExecutionEvent::Started("dyn1".into()),
                ExecutionEvent::Finished {
                    unique_id: "dyn1".into(),
                    result: TestExecutionResult::Successful,
                },
            ],
        )
        .unwrap();
        assert_eq!(log, vec!["started dyn1(Suite)", "finished dyn1(Suite)"]);

        let dyn1 = tree.description_for(&"dyn1".into()).unwrap();
        assert_eq!(tree.get(dyn1).class_name(), Some("Suite"));
    }

    #[test]
    fn test_unknown_identifier_is_an_error() {
        let mut tree = suite_tree();
        let err = replay(&mut tree, vec![ExecutionEvent::Started("ghost".into())]).unwrap_err();
        assert_eq!(err, ProjectionError::not_found(&"ghost".into()));
    }

    #[test]
    fn test_out_of_order_events_are_still_forwarded() {
        let mut tree = suite_tree();
        let mut listener = ProjectionListener::new(&mut tree, RecordingNotifier::new());
        let case1 = UniqueId::new("case1");

        listener
            .execution_finished(&case1, &TestExecutionResult::Successful)
            .unwrap();
        assert_eq!(listener.state_of(&case1), Some(ExecutionState::Finished));
        assert_eq!(listener.notifier().log(), vec!["finished case1(Suite)"]);
    }

    #[test]
    fn test_plan_events_use_suite_description() {
        let mut tree = suite_tree();
        let log = replay(&mut tree, vec![ExecutionEvent::PlanStarted, ExecutionEvent::PlanFinished]).unwrap();
        assert_eq!(log, vec!["suite started root", "suite finished root"]);
    }
}
