//! Segment-encoded unique identifiers.
//!
//! A unique ID is a `/`-separated path of `[type:value]` segments, outermost first. The last segment is the
//! node's *short ID*; everything before it encodes the ancestry.

use std::borrow::Borrow;
use std::fmt;

/// Separator between the segments of a [`UniqueId`].
pub const SEGMENT_SEPARATOR: char = '/';

/// Globally unique identifier of a plan node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueId(String);

impl UniqueId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Create the ID of a child node by appending one segment.
    pub fn append(&self, segment_type: &str, value: &str) -> Self {
        Self(format!("{}{SEGMENT_SEPARATOR}[{segment_type}:{value}]", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The substring after the last separator, or the whole ID when there is none.
    pub fn short_id(&self) -> &str {
        match self.0.rfind(SEGMENT_SEPARATOR) {
            Some(index) => &self.0[index + 1..],
            None => &self.0,
        }
    }

    /// The ID of the enclosing node, derived by dropping the last segment.
    pub fn parent(&self) -> Option<UniqueId> {
        self.0
            .rfind(SEGMENT_SEPARATOR)
            .map(|index| UniqueId(self.0[..index].to_string()))
    }

    /// Whether `self` lies strictly below `ancestor` in the encoded ancestry.
    pub fn is_descendant_of(&self, ancestor: &UniqueId) -> bool {
        self.0.len() > ancestor.0.len()
            && self.0.starts_with(ancestor.as_str())
            && self.0[ancestor.0.len()..].starts_with(SEGMENT_SEPARATOR)
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for UniqueId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UniqueId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UniqueId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
