//! Runner facade.
//!
//! Ties one discovered plan, its description tree and an event stream together. A run stops at the first event
//! that cannot be correlated.

use tracing::{debug, info};

use crate::config::RunConfig;
use crate::discovery::{self, PostDiscoveryFilter};
use crate::error::ProjectionResult;
use crate::listener::{ExecutionEvent, ProjectionListener};
use crate::notification::RunNotifier;
use crate::plan::TestPlan;
use crate::tree::{Description, DescriptionTree};

#[derive(Debug, Clone)]
pub struct ProjectionRunner {
    tree: DescriptionTree,
    config: RunConfig,
}

impl ProjectionRunner {
    pub fn new(plan: TestPlan, label: &str, config: RunConfig) -> ProjectionResult<Self> {
        Self::with_filters::<Box<dyn PostDiscoveryFilter>>(plan, &[], label, config)
    }

    /// Apply `filters` to `plan`, then project what is left.
    #[tracing::instrument(skip_all, fields(label = label, filters = filters.len()))]
    pub fn with_filters<F: PostDiscoveryFilter>(
        plan: TestPlan,
        filters: &[F],
        label: &str,
        config: RunConfig,
    ) -> ProjectionResult<Self> {
        let plan = if filters.is_empty() {
            plan
        } else {
            discovery::apply_filters(&plan, filters)?
        };
        if !plan.contains_tests() {
            info!("test plan contains no tests");
        }
        if config.is_parallel_execution_enabled() {
            debug!("parallel execution requested; events must still be delivered one at a time");
        }

        let tree = DescriptionTree::build_suite(plan, label, &config)?;
        Ok(Self { tree, config })
    }

    /// The suite root.
    pub fn description(&self) -> &Description {
        self.tree.suite_description()
    }

    pub fn tree(&self) -> &DescriptionTree {
        &self.tree
    }

    pub fn into_tree(self) -> DescriptionTree {
        self.tree
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Replay `events` against the tree, driving `notifier`. Returns the notifier when every event correlated.
    #[tracing::instrument(skip_all, fields(suite = self.tree.suite_description().name()))]
    pub fn run<N, I>(&mut self, events: I, notifier: N) -> ProjectionResult<N>
    where
        N: RunNotifier,
        I: IntoIterator<Item = ExecutionEvent>,
    {
        let mut listener = ProjectionListener::new(&mut self.tree, notifier);
        let mut delivered = 0usize;
        for event in events {
            event.dispatch(&mut listener)?;
            delivered += 1;
        }
        debug!(delivered, "run complete");
        Ok(listener.into_notifier())
    }
}
