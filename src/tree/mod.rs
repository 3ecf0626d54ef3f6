//! Legacy description tree.
//!
//! [`DescriptionTree`] projects a [`TestPlan`] onto the suite/test shape legacy runners understand. It owns the
//! plan, because dynamic registration during execution grows both the plan and the projection, and it keeps the
//! one-to-one, insertion-ordered map from unique IDs to descriptions that event correlation and leaf filtering
//! rely on.
//!
//! ## Layouts
//!
//! - [`DescriptionLayout::Nested`]: every description hangs under the description of its structural parent.
//! - [`DescriptionLayout::Folded`]: the strict two-level legacy shape. Non-dynamic containers get a description
//!   (so events and filters can find them) but are not attached; their children attach to the nearest attached
//!   ancestor instead.

pub mod description;
pub mod filter;
pub mod render;

use std::collections::HashMap;

use tracing::debug;
use treebridge_core::{TestIdentifier, UniqueId, segments};

use crate::config::RunConfig;
use crate::error::{ProjectionError, ProjectionResult};
use crate::naming::NameSynthesizer;
use crate::plan::{ParentPolicy, PlanQueries, PlanView, TestPlan};

pub use description::{Description, DescriptionId, DescriptionKind};

/// Class name of tests without a logical parent, and suite label of an empty plan.
pub const UNROOTED: &str = "<unrooted>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DescriptionLayout {
    #[default]
    Nested,
    Folded,
}

#[derive(Debug, Clone)]
pub struct DescriptionTree {
    plan: TestPlan,
    names: NameSynthesizer,
    layout: DescriptionLayout,
    parent_policy: ParentPolicy,
    arena: Vec<Description>,
    by_identifier: HashMap<UniqueId, DescriptionId>,
    // Where children of an identifier attach; differs from `by_identifier` only for folded containers
    anchors: HashMap<UniqueId, DescriptionId>,
    registration_order: Vec<UniqueId>,
    suite: DescriptionId,
}

impl DescriptionTree {
    /// Project `plan` under a suite root labelled `root_label`.
    ///
    /// A blank label falls back to the name of the first root, then to [`UNROOTED`].
    #[tracing::instrument(skip_all, fields(label = root_label, identifiers = plan.len()))]
    pub fn build_suite(plan: TestPlan, root_label: &str, config: &RunConfig) -> ProjectionResult<Self> {
        let names = config.synthesizer();
        let label = if root_label.trim().is_empty() {
            let view = PlanView::with_policy(&plan, config.parent_policy);
            plan.roots()
                .first()
                .map(|root| names.name_of(&view, root))
                .unwrap_or_else(|| UNROOTED.to_string())
        } else {
            root_label.to_string()
        };

        let mut tree = Self {
            plan,
            names,
            layout: config.layout,
            parent_policy: config.parent_policy,
            arena: vec![Description::suite(label, None)],
            by_identifier: HashMap::new(),
            anchors: HashMap::new(),
            registration_order: Vec::new(),
            suite: DescriptionId(0),
        };

        let roots: Vec<UniqueId> = tree.plan.roots().iter().map(|r| r.unique_id().clone()).collect();
        for root in &roots {
            tree.materialize(root, tree.suite)?;
        }

        debug!(descriptions = tree.arena.len(), "description tree built");
        Ok(tree)
    }

    /// Create the description for `unique_id` under `parent`, register it, then recurse into its children.
    pub fn materialize(&mut self, unique_id: &UniqueId, parent: DescriptionId) -> ProjectionResult<DescriptionId> {
        if let Some(&existing) = self.by_identifier.get(unique_id) {
            return Ok(existing);
        }

        let (description, attach, children) = {
            let view = self.view();
            let identifier = view.identifier(unique_id)?;
            let name = self.names.name_of(&view, identifier);
            let description = if identifier.is_test() {
                let class_name = view
                    .logical_parent_of(unique_id)
                    .map(|p| self.names.name_of(&view, p))
                    .unwrap_or_else(|| UNROOTED.to_string());
                Description::test(name, class_name, unique_id.clone())
            } else {
                Description::suite(name, Some(unique_id.clone()))
            };
            let children: Vec<UniqueId> = view
                .children_of(unique_id)
                .iter()
                .map(|c| c.unique_id().clone())
                .collect();
            (description, self.attaches(identifier), children)
        };

        let id = DescriptionId(self.arena.len());
        let anchor = if attach { id } else { parent };
        self.arena.push(description);
        if attach {
            self.arena[parent.0].push_child(id);
        }
        self.by_identifier.insert(unique_id.clone(), id);
        self.anchors.insert(unique_id.clone(), anchor);
        self.registration_order.push(unique_id.clone());

        for child in &children {
            self.materialize(child, anchor)?;
        }
        Ok(id)
    }

    /// Materialize `new_id`, already part of the plan, under the description registered for `parent_unique_id`.
    pub fn extend(&mut self, new_id: &UniqueId, parent_unique_id: &UniqueId) -> ProjectionResult<DescriptionId> {
        let anchor = self.anchors.get(parent_unique_id).copied().ok_or_else(|| {
            ProjectionError::invalid_state(new_id, format!("parent '{parent_unique_id}' has no description"))
        })?;
        self.materialize(new_id, anchor)
    }

    /// Register a node reported during execution: add it to the plan and extend the projection.
    ///
    /// Registering the same unique ID twice returns the existing description.
    pub fn add_dynamic(&mut self, identifier: TestIdentifier) -> ProjectionResult<DescriptionId> {
        let unique_id = identifier.unique_id().clone();
        if let Some(&existing) = self.by_identifier.get(&unique_id) {
            return Ok(existing);
        }

        let parent_id = identifier.parent_id().cloned();
        let segment = identifier.dynamic_kind().map(segments::as_str).unwrap_or("static");
        if let Some(parent_id) = &parent_id {
            if !self.anchors.contains_key(parent_id) {
                return Err(ProjectionError::invalid_state(
                    &unique_id,
                    format!("parent '{parent_id}' has no description"),
                ));
            }
        }
        self.plan.add(identifier)?;

        let id = match &parent_id {
            Some(parent_id) => self.extend(&unique_id, parent_id)?,
            None => self.materialize(&unique_id, self.suite)?,
        };
        debug!(unique_id = %unique_id, segment, name = self.get(id).name(), "registered dynamic node");
        Ok(id)
    }

    fn attaches(&self, identifier: &TestIdentifier) -> bool {
        match self.layout {
            DescriptionLayout::Nested => true,
            DescriptionLayout::Folded => identifier.is_test() || identifier.is_dynamic(),
        }
    }

    pub fn description_for(&self, unique_id: &UniqueId) -> ProjectionResult<DescriptionId> {
        self.by_identifier
            .get(unique_id)
            .copied()
            .ok_or_else(|| ProjectionError::not_found(unique_id))
    }

    pub fn get(&self, id: DescriptionId) -> &Description {
        &self.arena[id.0]
    }

    pub fn suite(&self) -> DescriptionId {
        self.suite
    }

    pub fn suite_description(&self) -> &Description {
        self.get(self.suite)
    }

    /// Registered unique IDs with their descriptions, in registration order.
    pub fn registered(&self) -> impl Iterator<Item = (&UniqueId, DescriptionId)> {
        self.registration_order
            .iter()
            .filter_map(|unique_id| self.by_identifier.get(unique_id).map(|&id| (unique_id, id)))
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }

    pub fn plan(&self) -> &TestPlan {
        &self.plan
    }

    pub fn view(&self) -> PlanView<'_> {
        PlanView::with_policy(&self.plan, self.parent_policy)
    }

    pub fn layout(&self) -> DescriptionLayout {
        self.layout
    }

    /// The current synthesized name of a plan node.
    pub fn name_of(&self, unique_id: &UniqueId) -> ProjectionResult<String> {
        let view = self.view();
        let identifier = view.identifier(unique_id)?;
        Ok(self.names.name_of(&view, identifier))
    }
}
