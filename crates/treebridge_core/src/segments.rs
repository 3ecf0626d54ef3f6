//! Dynamic segment vocabulary registry.
//!
//! Nodes generated while a plan executes (template invocations, factory-produced tests and containers) are
//! recognized purely structurally: their short ID starts with one of the markers below. This module centralizes
//! those spellings so downstream code never compares segment strings by hand.

/// Stable identifier for a dynamic segment marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// One invocation of a test template (parameterized or repeated test).
    TestTemplateInvocation,
    /// A test produced by a test factory at execution time.
    DynamicTest,
    DynamicContainer,
    /// A method whose return value generates dynamic tests.
    TestFactory,
    /// A method executed once per invocation context.
    TestTemplate,
}

/// Metadata entry for a dynamic segment marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentInfo {
    pub id: SegmentKind,
    /// Segment type as it appears between `[` and `:` in a unique ID.
    pub segment_type: &'static str,
}

impl SegmentInfo {
    /// Whether `short_id` opens with this segment's marker (`[` + segment type).
    pub fn matches(&self, short_id: &str) -> bool {
        short_id
            .strip_prefix('[')
            .is_some_and(|rest| rest.starts_with(self.segment_type))
    }
}

/// Registry of dynamic segment markers.
///
/// Prefix matching means `test-template-invocation` must be listed before `test-template`, otherwise
/// invocations would resolve to their template.
pub const DYNAMIC_SEGMENTS: &[SegmentInfo] = &[
    info(SegmentKind::TestTemplateInvocation, "test-template-invocation"),
    info(SegmentKind::DynamicTest, "dynamic-test"),
    info(SegmentKind::DynamicContainer, "dynamic-container"),
    info(SegmentKind::TestFactory, "test-factory"),
    info(SegmentKind::TestTemplate, "test-template"),
];

/// Resolve a short ID to the dynamic segment it starts with, if any.
pub fn from_short_id(short_id: &str) -> Option<SegmentKind> {
    DYNAMIC_SEGMENTS.iter().find(|s| s.matches(short_id)).map(|s| s.id)
}

/// Whether a short ID marks a dynamically generated node.
pub fn is_dynamic(short_id: &str) -> bool {
    from_short_id(short_id).is_some()
}

/// Return the segment type spelling for a marker (e.g. `dynamic-test`).
pub fn as_str(id: SegmentKind) -> &'static str {
    info_for(id).segment_type
}

/// Return the metadata entry for a marker.
pub fn info_for(id: SegmentKind) -> &'static SegmentInfo {
    match id {
        SegmentKind::TestTemplateInvocation => &DYNAMIC_SEGMENTS[0],
        SegmentKind::DynamicTest => &DYNAMIC_SEGMENTS[1],
        SegmentKind::DynamicContainer => &DYNAMIC_SEGMENTS[2],
        SegmentKind::TestFactory => &DYNAMIC_SEGMENTS[3],
        SegmentKind::TestTemplate => &DYNAMIC_SEGMENTS[4],
    }
}

const fn info(id: SegmentKind, segment_type: &'static str) -> SegmentInfo {
    SegmentInfo { id, segment_type }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_info_for() {
        for entry in DYNAMIC_SEGMENTS {
            assert_eq!(info_for(entry.id), entry);
        }
    }

    #[test]
    fn test_invocation_resolves_before_template() {
        assert_eq!(
            from_short_id("[test-template-invocation:#3]"),
            Some(SegmentKind::TestTemplateInvocation)
        );
        assert_eq!(
            from_short_id("[test-template:adds(int)]"),
            Some(SegmentKind::TestTemplate)
        );
    }

    #[test]
    fn test_all_markers_are_dynamic() {
        for short_id in [
            "[test-factory:numbers()]",
            "[dynamic-test:#1]",
            "[dynamic-container:#2]",
            "[test-template:m(String)]",
            "[test-template-invocation:#1]",
        ] {
            assert!(is_dynamic(short_id), "{short_id} should be dynamic");
        }
    }

    #[test]
    fn test_static_segments_are_not_dynamic() {
        for short_id in ["[engine:junit-jupiter]", "[class:com.example.Calc]", "[method:adds()]", "", "dynamic-test"] {
            assert!(!is_dynamic(short_id), "{short_id} should not be dynamic");
        }
    }

    #[test]
    fn test_as_str() {
        assert_eq!(as_str(SegmentKind::DynamicContainer), "dynamic-container");
    }
}
