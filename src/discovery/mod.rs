//! Post-discovery filtering and plan fixtures.
//!
//! Filters decide per identifier whether it stays in the plan. Only tests and dynamic nodes (including test
//! templates and factories) are subject to filtering; static containers are kept while anything below them
//! survives.

pub mod fixture;
pub mod sharding;
pub mod tags;

use std::collections::HashSet;

use tracing::debug;
use treebridge_core::{TestIdentifier, UniqueId};

use crate::error::ProjectionResult;
use crate::plan::{PlanQueries, TestPlan};

pub use sharding::ShardingFilter;
pub use tags::TagFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterResult {
    Included,
    Excluded(String),
}

impl FilterResult {
    pub fn excluded(reason: impl Into<String>) -> Self {
        Self::Excluded(reason.into())
    }

    pub fn is_included(&self) -> bool {
        matches!(self, FilterResult::Included)
    }
}

/// A predicate over discovered identifiers, applied before the plan is projected.
pub trait PostDiscoveryFilter {
    fn apply(&self, identifier: &TestIdentifier) -> FilterResult;
}

impl<F: PostDiscoveryFilter + ?Sized> PostDiscoveryFilter for Box<F> {
    fn apply(&self, identifier: &TestIdentifier) -> FilterResult {
        (**self).apply(identifier)
    }
}

/// Whether filters get a say on `identifier`.
pub fn is_filterable(identifier: &TestIdentifier) -> bool {
    identifier.is_test() || identifier.is_dynamic()
}

/// Build the plan that remains after `filters`.
///
/// A filterable identifier survives when every filter includes it. Containers survive when they are roots or
/// have a surviving descendant; ancestors of survivors always survive.
pub fn apply_filters<F: PostDiscoveryFilter>(plan: &TestPlan, filters: &[F]) -> ProjectionResult<TestPlan> {
    if filters.is_empty() {
        return Ok(plan.clone());
    }

    let included = |identifier: &TestIdentifier| -> bool {
        filters.iter().all(|filter| match filter.apply(identifier) {
            FilterResult::Included => true,
            FilterResult::Excluded(reason) => {
                debug!(unique_id = %identifier.unique_id(), reason = %reason, "excluded by filter");
                false
            }
        })
    };

    let mut kept = HashSet::<UniqueId>::new();
    for identifier in plan.iter() {
        if is_filterable(identifier) && included(identifier) {
            let mut current = Some(identifier);
            while let Some(node) = current {
                if !kept.insert(node.unique_id().clone()) {
                    break;
                }
                current = plan.parent_of(node.unique_id());
            }
        }
    }
    for root in plan.roots() {
        kept.insert(root.unique_id().clone());
    }

    TestPlan::from_identifiers(
        plan.iter()
            .filter(|identifier| kept.contains(identifier.unique_id()))
            .cloned(),
    )
}
