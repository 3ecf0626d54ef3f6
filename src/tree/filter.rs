//! Leaf filtering.
//!
//! Selecting a container implicitly selects everything below it. When both a node and one of its descendants
//! match, only the descendant is kept, so the selection can be executed without running anything twice.

use std::collections::BTreeSet;

use treebridge_core::UniqueId;

use super::{Description, DescriptionTree};
use crate::plan::PlanQueries;

impl DescriptionTree {
    /// Unique IDs whose description matches `predicate` and that have no matching structural descendant.
    pub fn filtered_leaves(&self, predicate: impl Fn(&Description) -> bool) -> BTreeSet<UniqueId> {
        let matched: BTreeSet<UniqueId> = self
            .registered()
            .filter(|&(_, id)| predicate(self.get(id)))
            .map(|(unique_id, _)| unique_id.clone())
            .collect();
        retain_leaves(&matched, self.plan())
    }
}

/// Drop every member of `matched` that has a descendant in `matched`.
pub fn retain_leaves(matched: &BTreeSet<UniqueId>, plan: &impl PlanQueries) -> BTreeSet<UniqueId> {
    matched
        .iter()
        .filter(|unique_id| {
            !plan
                .descendants_of(unique_id)
                .iter()
                .any(|descendant| matched.contains(descendant.unique_id()))
        })
        .cloned()
        .collect()
}

/// Whether `description` is one of `selected` or lies below one of them.
///
/// Ancestry is read from the segment encoding of the unique ID, so descriptions registered after the selection
/// was made are still recognized. The suite root is never selected.
pub fn is_selected(description: &Description, selected: &BTreeSet<UniqueId>) -> bool {
    description.unique_id().is_some_and(|unique_id| {
        selected.contains(unique_id) || selected.iter().any(|root| unique_id.is_descendant_of(root))
    })
}
