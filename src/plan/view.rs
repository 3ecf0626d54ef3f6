//! Logical view over a test plan.
//!
//! Dynamically generated nodes are structurally nested under the node that generated them (an invocation under
//! its template, a dynamic test under its factory). For grouping and naming, each of them should instead sit
//! next to its siblings under the nearest real ancestor. [`PlanView`] forwards every query to the wrapped plan
//! except [`PlanQueries::parent_of`], which it answers with the logical parent.

use treebridge_core::{TestIdentifier, UniqueId};

use super::{PlanQueries, TestPlan};
use crate::error::ProjectionResult;

/// How the logical parent of a dynamic node is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentPolicy {
    /// Walk up the structural parents and return the first one that is not dynamic.
    #[default]
    SkipDynamicAncestors,
    /// Always take the structural grandparent. Only correct for one level of dynamic nesting.
    Grandparent,
}

/// Resolve the logical parent of `node`.
///
/// `parent_of` must return the structural parent. Non-dynamic nodes always get their structural parent back.
pub fn resolve_logical_parent<'a, F>(
    node: &'a TestIdentifier,
    policy: ParentPolicy,
    parent_of: F,
) -> Option<&'a TestIdentifier>
where
    F: Fn(&TestIdentifier) -> Option<&'a TestIdentifier>,
{
    let parent = parent_of(node);
    if !node.is_dynamic() {
        return parent;
    }

    match policy {
        ParentPolicy::SkipDynamicAncestors => {
            let mut current = parent;
            while let Some(candidate) = current {
                if !candidate.is_dynamic() {
                    return Some(candidate);
                }
                current = parent_of(candidate);
            }
            None
        }
        ParentPolicy::Grandparent => parent.and_then(|p| parent_of(p)),
    }
}

/// Read-through wrapper over a [`TestPlan`] with logical parent resolution.
#[derive(Debug, Clone, Copy)]
pub struct PlanView<'a> {
    plan: &'a TestPlan,
    policy: ParentPolicy,
}

impl<'a> PlanView<'a> {
    pub fn new(plan: &'a TestPlan) -> Self {
        Self::with_policy(plan, ParentPolicy::default())
    }

    pub fn with_policy(plan: &'a TestPlan, policy: ParentPolicy) -> Self {
        Self { plan, policy }
    }

    /// The wrapped plan.
    pub fn plan(&self) -> &'a TestPlan {
        self.plan
    }

    pub fn policy(&self) -> ParentPolicy {
        self.policy
    }

    /// The structural parent, bypassing the override.
    pub fn structural_parent_of(&self, unique_id: &UniqueId) -> Option<&'a TestIdentifier> {
        self.plan.parent_of(unique_id)
    }

    pub fn logical_parent_of(&self, unique_id: &UniqueId) -> Option<&'a TestIdentifier> {
        let plan = self.plan;
        let node = plan.get(unique_id)?;
        resolve_logical_parent(node, self.policy, |n: &TestIdentifier| plan.parent_of(n.unique_id()))
    }
}

impl PlanQueries for PlanView<'_> {
    fn roots(&self) -> Vec<&TestIdentifier> {
        self.plan.roots()
    }

    fn children_of(&self, unique_id: &UniqueId) -> Vec<&TestIdentifier> {
        self.plan.children_of(unique_id)
    }

    fn descendants_of(&self, unique_id: &UniqueId) -> Vec<&TestIdentifier> {
        self.plan.descendants_of(unique_id)
    }

    fn parent_of(&self, unique_id: &UniqueId) -> Option<&TestIdentifier> {
        self.logical_parent_of(unique_id)
    }

    fn identifier(&self, unique_id: &UniqueId) -> ProjectionResult<&TestIdentifier> {
        self.plan.identifier(unique_id)
    }

    fn count_matching(&self, predicate: &dyn Fn(&TestIdentifier) -> bool) -> usize {
        self.plan.count_matching(predicate)
    }
}
