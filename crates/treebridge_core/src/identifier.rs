//! Plan nodes.

use std::collections::BTreeSet;

use crate::ids::UniqueId;
use crate::segments::{self, SegmentKind};
use crate::source::TestSource;

/// Whether a node groups other nodes or produces an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Container,
    Test,
}

/// An immutable node of a discovered test plan.
///
/// Built once (at discovery or on dynamic registration) through the `with_*` methods, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentifier {
    unique_id: UniqueId,
    parent_id: Option<UniqueId>,
    display_name: String,
    legacy_reporting_name: String,
    kind: IdentifierKind,
    source: Option<TestSource>,
    tags: BTreeSet<String>,
    dynamic: Option<SegmentKind>,
}

impl TestIdentifier {
    /// Create a node whose parent is encoded in its unique ID.
    pub fn new(unique_id: impl Into<UniqueId>, display_name: impl Into<String>, kind: IdentifierKind) -> Self {
        let unique_id = unique_id.into();
        let display_name = display_name.into();
        Self {
            parent_id: unique_id.parent(),
            dynamic: segments::from_short_id(unique_id.short_id()),
            legacy_reporting_name: display_name.clone(),
            unique_id,
            display_name,
            kind,
            source: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn container(unique_id: impl Into<UniqueId>, display_name: impl Into<String>) -> Self {
        Self::new(unique_id, display_name, IdentifierKind::Container)
    }

    pub fn test(unique_id: impl Into<UniqueId>, display_name: impl Into<String>) -> Self {
        Self::new(unique_id, display_name, IdentifierKind::Test)
    }

    /// Override the parent derived from the unique ID.
    pub fn with_parent(mut self, parent_id: Option<UniqueId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_legacy_reporting_name(mut self, name: impl Into<String>) -> Self {
        self.legacy_reporting_name = name.into();
        self
    }

    pub fn with_source(mut self, source: TestSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    pub fn parent_id(&self) -> Option<&UniqueId> {
        self.parent_id.as_ref()
    }

    pub fn short_id(&self) -> &str {
        self.unique_id.short_id()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn legacy_reporting_name(&self) -> &str {
        &self.legacy_reporting_name
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    pub fn source(&self) -> Option<&TestSource> {
        self.source.as_ref()
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn is_container(&self) -> bool {
        self.kind == IdentifierKind::Container
    }

    pub fn is_test(&self) -> bool {
        self.kind == IdentifierKind::Test
    }

    /// Whether this node was generated at execution time.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic.is_some()
    }

    pub fn dynamic_kind(&self) -> Option<SegmentKind> {
        self.dynamic
    }
}
