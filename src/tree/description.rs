//! Legacy description nodes.

use treebridge_core::UniqueId;

/// Index of a [`Description`] inside the tree that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptionId(pub(crate) usize);

impl DescriptionId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKind {
    /// Groups other descriptions. The suite root and every container.
    Suite,
    /// A runnable leaf the legacy runner reports on.
    Test,
}

/// A node of the legacy suite/test tree.
///
/// Legacy runners identify a test by the pair (class name, method name), so test descriptions always carry both:
/// the method name is the synthesized name of the test, the class name that of its logical parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    name: String,
    class_name: Option<String>,
    unique_id: Option<UniqueId>,
    kind: DescriptionKind,
    children: Vec<DescriptionId>,
}

impl Description {
    pub(crate) fn suite(name: impl Into<String>, unique_id: Option<UniqueId>) -> Self {
        Self {
            name: name.into(),
            class_name: None,
            unique_id,
            kind: DescriptionKind::Suite,
            children: Vec::new(),
        }
    }

    pub(crate) fn test(name: impl Into<String>, class_name: impl Into<String>, unique_id: UniqueId) -> Self {
        Self {
            name: name.into(),
            class_name: Some(class_name.into()),
            unique_id: Some(unique_id),
            kind: DescriptionKind::Test,
            children: Vec::new(),
        }
    }

    pub(crate) fn push_child(&mut self, child: DescriptionId) {
        self.children.push(child);
    }

    /// The synthesized name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name shown by legacy reports: `method(Class)` for tests, the plain name for suites.
    pub fn display_name(&self) -> String {
        match &self.class_name {
            Some(class_name) if self.is_test() => format!("{}({class_name})", self.name),
            _ => self.name.clone(),
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn method_name(&self) -> Option<&str> {
        self.is_test().then_some(self.name.as_str())
    }

    /// The originating identifier. `None` only for the suite root.
    pub fn unique_id(&self) -> Option<&UniqueId> {
        self.unique_id.as_ref()
    }

    pub fn kind(&self) -> DescriptionKind {
        self.kind
    }

    pub fn is_test(&self) -> bool {
        self.kind == DescriptionKind::Test
    }

    pub fn is_suite(&self) -> bool {
        self.kind == DescriptionKind::Suite
    }

    pub fn children(&self) -> &[DescriptionId] {
        &self.children
    }
}
