//! Discovered test plans.
//!
//! A [`TestPlan`] owns every identifier the platform reported, either at discovery or through dynamic
//! registration during execution. The structural parent relation is a strict tree: each identifier names at most
//! one parent, and that parent must already be part of the plan when the child is added. Children are kept in
//! insertion order so projections are deterministic.
//!
//! [`PlanQueries`] is the read surface shared by the plan and by [`view::PlanView`], which overrides only parent
//! resolution.

pub mod view;

use std::collections::HashMap;

use treebridge_core::{TestIdentifier, UniqueId};

use crate::error::{ProjectionError, ProjectionResult};

pub use view::{ParentPolicy, PlanView};

/// Read-only queries over a test plan graph.
pub trait PlanQueries {
    /// Identifiers without a parent, in insertion order.
    fn roots(&self) -> Vec<&TestIdentifier>;

    /// Direct children, in insertion order.
    fn children_of(&self, unique_id: &UniqueId) -> Vec<&TestIdentifier>;

    /// Transitive closure of [`PlanQueries::children_of`], pre-order. Callers should treat it as a set.
    fn descendants_of(&self, unique_id: &UniqueId) -> Vec<&TestIdentifier>;

    fn parent_of(&self, unique_id: &UniqueId) -> Option<&TestIdentifier>;

    /// Look up an identifier, failing with [`ProjectionError::NotFound`] when it was never added.
    fn identifier(&self, unique_id: &UniqueId) -> ProjectionResult<&TestIdentifier>;

    fn count_matching(&self, predicate: &dyn Fn(&TestIdentifier) -> bool) -> usize;
}

#[derive(Debug, Clone, Default)]
pub struct TestPlan {
    identifiers: HashMap<UniqueId, TestIdentifier>,
    insertion_order: Vec<UniqueId>,
    roots: Vec<UniqueId>,
    children: HashMap<UniqueId, Vec<UniqueId>>,
}

impl TestPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plan from identifiers listed parents-first.
    pub fn from_identifiers(identifiers: impl IntoIterator<Item = TestIdentifier>) -> ProjectionResult<Self> {
        let mut plan = Self::new();
        for identifier in identifiers {
            plan.add(identifier)?;
        }
        Ok(plan)
    }

    /// Insert an identifier.
    ///
    /// Adding an identifier whose unique ID is already present is a no-op. A declared parent that is not part
    /// of the plan is rejected with [`ProjectionError::InvalidState`].
    pub fn add(&mut self, identifier: TestIdentifier) -> ProjectionResult<()> {
        let unique_id = identifier.unique_id().clone();
        if self.identifiers.contains_key(&unique_id) {
            return Ok(());
        }

        match identifier.parent_id() {
            Some(parent_id) => {
                if !self.identifiers.contains_key(parent_id) {
                    return Err(ProjectionError::invalid_state(
                        &unique_id,
                        format!("parent '{parent_id}' is not part of the test plan"),
                    ));
                }
                self.children
                    .entry(parent_id.clone())
                    .or_default()
                    .push(unique_id.clone());
            }
            None => self.roots.push(unique_id.clone()),
        }

        self.insertion_order.push(unique_id.clone());
        self.identifiers.insert(unique_id, identifier);
        Ok(())
    }

    pub fn get(&self, unique_id: &UniqueId) -> Option<&TestIdentifier> {
        self.identifiers.get(unique_id)
    }

    pub fn contains(&self, unique_id: &UniqueId) -> bool {
        self.identifiers.contains_key(unique_id)
    }

    /// All identifiers in insertion order (parents always precede their children).
    pub fn iter(&self) -> impl Iterator<Item = &TestIdentifier> {
        self.insertion_order.iter().filter_map(|id| self.identifiers.get(id))
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn contains_tests(&self) -> bool {
        self.identifiers.values().any(TestIdentifier::is_test)
    }

    fn lookup_all<'a>(&'a self, ids: &'a [UniqueId]) -> impl Iterator<Item = &'a TestIdentifier> + 'a {
        ids.iter().filter_map(|id| self.identifiers.get(id))
    }
}

impl PlanQueries for TestPlan {
    fn roots(&self) -> Vec<&TestIdentifier> {
        self.lookup_all(&self.roots).collect()
    }

    fn children_of(&self, unique_id: &UniqueId) -> Vec<&TestIdentifier> {
        match self.children.get(unique_id) {
            Some(children) => self.lookup_all(children).collect(),
            None => Vec::new(),
        }
    }

    fn descendants_of(&self, unique_id: &UniqueId) -> Vec<&TestIdentifier> {
        let mut descendants = Vec::new();
        let mut stack: Vec<&TestIdentifier> = self.children_of(unique_id);
        stack.reverse();

        while let Some(node) = stack.pop() {
            descendants.push(node);
            let mut children = self.children_of(node.unique_id());
            children.reverse();
            stack.extend(children);
        }

        descendants
    }

    fn parent_of(&self, unique_id: &UniqueId) -> Option<&TestIdentifier> {
        self.identifiers
            .get(unique_id)
            .and_then(TestIdentifier::parent_id)
            .and_then(|parent_id| self.identifiers.get(parent_id))
    }

    fn identifier(&self, unique_id: &UniqueId) -> ProjectionResult<&TestIdentifier> {
        self.identifiers
            .get(unique_id)
            .ok_or_else(|| ProjectionError::not_found(unique_id))
    }

    fn count_matching(&self, predicate: &dyn Fn(&TestIdentifier) -> bool) -> usize {
        self.identifiers.values().filter(|identifier| predicate(identifier)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> TestPlan {
        TestPlan::from_identifiers([
            TestIdentifier::container("[engine:e]", "JUnit Jupiter"),
            TestIdentifier::container("[engine:e]/[class:Calc]", "Calc"),
            TestIdentifier::test("[engine:e]/[class:Calc]/[method:adds()]", "adds()"),
            TestIdentifier::container("[engine:e]/[class:Calc]/[class:Nested]", "Nested"),
            TestIdentifier::test("[engine:e]/[class:Calc]/[class:Nested]/[method:divides()]", "divides()"),
            TestIdentifier::test("[engine:e]/[class:Calc]/[method:subtracts()]", "subtracts()"),
        ])
        .unwrap()
    }

    fn ids<'a>(identifiers: impl IntoIterator<Item = &'a TestIdentifier>) -> Vec<&'a str> {
        identifiers.into_iter().map(|i| i.unique_id().as_str()).collect()
    }

    #[test]
    fn test_roots_and_children_keep_insertion_order() {
        let plan = sample_plan();
        assert_eq!(ids(plan.roots()), vec!["[engine:e]"]);
        assert_eq!(
            ids(plan.children_of(&"[engine:e]/[class:Calc]".into())),
            vec![
                "[engine:e]/[class:Calc]/[method:adds()]",
                "[engine:e]/[class:Calc]/[class:Nested]",
                "[engine:e]/[class:Calc]/[method:subtracts()]",
            ]
        );
    }

    #[test]
    fn test_descendants_are_preorder() {
        let plan = sample_plan();
        assert_eq!(
            ids(plan.descendants_of(&"[engine:e]".into())),
            vec![
                "[engine:e]/[class:Calc]",
                "[engine:e]/[class:Calc]/[method:adds()]",
                "[engine:e]/[class:Calc]/[class:Nested]",
                "[engine:e]/[class:Calc]/[class:Nested]/[method:divides()]",
                "[engine:e]/[class:Calc]/[method:subtracts()]",
            ]
        );
        assert!(plan.descendants_of(&"[engine:e]/[class:Calc]/[method:adds()]".into()).is_empty());
    }

    #[test]
    fn test_parent_of_is_structural() {
        let plan = sample_plan();
        let parent = plan.parent_of(&"[engine:e]/[class:Calc]/[class:Nested]/[method:divides()]".into());
        assert_eq!(parent.map(|p| p.display_name()), Some("Nested"));
        assert!(plan.parent_of(&"[engine:e]".into()).is_none());
    }

    #[test]
    fn test_identifier_lookup_fails_with_not_found() {
        let plan = sample_plan();
        let missing = UniqueId::new("[engine:e]/[class:Missing]");
        assert_eq!(plan.identifier(&missing), Err(ProjectionError::not_found(&missing)));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut plan = sample_plan();
        let class_id = UniqueId::new("[engine:e]/[class:Calc]");
        let before: Vec<String> = plan
            .descendants_of(&class_id)
            .iter()
            .map(|i| i.unique_id().to_string())
            .collect();

        plan.add(TestIdentifier::test("[engine:e]/[class:Calc]/[method:adds()]", "adds()"))
            .unwrap();
        plan.add(TestIdentifier::test("[engine:e]/[class:Calc]/[method:adds()]", "adds()"))
            .unwrap();

        let after: Vec<String> = plan
            .descendants_of(&class_id)
            .iter()
            .map(|i| i.unique_id().to_string())
            .collect();
        assert_eq!(before, after);
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn test_add_with_unknown_parent_is_invalid_state() {
        let mut plan = sample_plan();
        let orphan = TestIdentifier::test("[engine:e]/[class:Other]/[method:m()]", "m()");
        let err = plan.add(orphan).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidState { .. }));
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn test_late_insertion_extends_indices() {
        let mut plan = sample_plan();
        plan.add(TestIdentifier::test(
            "[engine:e]/[class:Calc]/[class:Nested]/[method:multiplies()]",
            "multiplies()",
        ))
        .unwrap();

        assert_eq!(plan.children_of(&"[engine:e]/[class:Calc]/[class:Nested]".into()).len(), 2);
        assert_eq!(plan.descendants_of(&"[engine:e]".into()).len(), 6);
    }

    #[test]
    fn test_count_matching_and_contains_tests() {
        let plan = sample_plan();
        assert_eq!(plan.count_matching(&|i| i.is_test()), 3);
        assert_eq!(plan.count_matching(&|i| i.is_container()), 3);
        assert!(plan.contains_tests());
        assert!(!TestPlan::new().contains_tests());
    }
}
