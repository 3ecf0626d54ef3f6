//! Name synthesis for projected nodes.
//!
//! Every Description the legacy runner sees is named here:
//!
//! | Identifier | Name |
//! |---|---|
//! | container | formatted display name, or the source-derived technical name |
//! | dynamic test | formatted names of the consecutive dynamic ancestors, outermost first, joined by `": "` |
//! | other test | formatted display name |
//!
//! Names are a pure function of the plan at call time. Plans only grow and identifiers never change, so a
//! name computed early stays valid for the rest of the run.

pub mod formatter;

use treebridge_core::{IdentifierKind, TestIdentifier};

use crate::plan::PlanView;

/// Delimiter between the components of a folded dynamic test name.
pub const DYNAMIC_NAME_DELIMITER: &str = ": ";

/// How containers are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingMode {
    /// Formatted display names.
    #[default]
    Display,
    /// Names derived from the source: qualified class names and `method(parameterTypes)`.
    Technical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NameSynthesizer {
    naming: NamingMode,
    legacy_format: bool,
}

impl NameSynthesizer {
    pub fn new(naming: NamingMode, legacy_format: bool) -> Self {
        Self { naming, legacy_format }
    }

    pub fn naming(&self) -> NamingMode {
        self.naming
    }

    pub fn legacy_format(&self) -> bool {
        self.legacy_format
    }

    pub fn name_of(&self, view: &PlanView<'_>, identifier: &TestIdentifier) -> String {
        match identifier.kind() {
            IdentifierKind::Container => self.container_name(identifier),
            IdentifierKind::Test if identifier.is_dynamic() => self.dynamic_test_name(view, identifier),
            IdentifierKind::Test => formatter::format(identifier, self.legacy_format),
        }
    }

    fn container_name(&self, identifier: &TestIdentifier) -> String {
        match self.naming {
            NamingMode::Display => formatter::format_display_name(identifier.display_name()),
            NamingMode::Technical => identifier
                .source()
                .and_then(|source| source.technical_name())
                .unwrap_or_else(|| identifier.display_name().to_string()),
        }
    }

    fn dynamic_test_name(&self, view: &PlanView<'_>, identifier: &TestIdentifier) -> String {
        // Isolated method runs match on the raw method name, so there is nothing to fold
        if self.legacy_format {
            return formatter::format(identifier, true);
        }

        let mut components = Vec::new();
        let mut current = Some(identifier);
        while let Some(node) = current.filter(|n| n.is_dynamic()) {
            components.push(formatter::format(node, false));
            current = view.structural_parent_of(node.unique_id());
        }
        components.reverse();
        components.join(DYNAMIC_NAME_DELIMITER)
    }
}
