//! Tag filters and the filter-file format.
//!
//! A filter file holds one directive per line: `-t <tags>` includes, `-T <tags>` excludes. `<tags>` is a
//! comma-separated list. Anything else is ignored.

use std::collections::BTreeSet;

use treebridge_core::TestIdentifier;

use super::{FilterResult, PostDiscoveryFilter};

const INCLUDE_PREFIX: &str = "-t ";
const EXCLUDE_PREFIX: &str = "-T ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    /// Keep tests and dynamic nodes carrying at least one of the tags.
    Include(BTreeSet<String>),
    /// Drop tests and dynamic nodes carrying any of the tags.
    Exclude(BTreeSet<String>),
}

impl TagFilter {
    pub fn include<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(tags.into_iter().map(Into::into).collect())
    }

    pub fn exclude<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exclude(tags.into_iter().map(Into::into).collect())
    }
}

impl PostDiscoveryFilter for TagFilter {
    fn apply(&self, identifier: &TestIdentifier) -> FilterResult {
        if !super::is_filterable(identifier) {
            return FilterResult::Included;
        }
        let tags = identifier.tags();
        match self {
            TagFilter::Include(wanted) if wanted.iter().any(|t| tags.contains(t)) => FilterResult::Included,
            TagFilter::Include(wanted) => FilterResult::excluded(format!("does not carry any of {wanted:?}")),
            TagFilter::Exclude(unwanted) => match unwanted.iter().find(|t| tags.contains(*t)) {
                Some(tag) => FilterResult::excluded(format!("tagged '{tag}'")),
                None => FilterResult::Included,
            },
        }
    }
}

/// Parse filter directives, one per line.
pub fn parse_filter_lines(contents: &str) -> Vec<TagFilter> {
    contents
        .lines()
        .filter_map(|line| {
            if let Some(tags) = line.strip_prefix(INCLUDE_PREFIX) {
                Some(TagFilter::include(split_tags(tags)))
            } else {
                line.strip_prefix(EXCLUDE_PREFIX)
                    .map(|tags| TagFilter::exclude(split_tags(tags)))
            }
        })
        .collect()
}

fn split_tags(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_lines() {
        let filters = parse_filter_lines("-t fast\n-T slow, flaky\n# comment\n-x other\n");
        assert_eq!(
            filters,
            vec![TagFilter::include(["fast"]), TagFilter::exclude(["slow", "flaky"])]
        );
    }

    #[test]
    fn test_include_and_exclude() {
        let fast = TestIdentifier::test("[engine:e]/[method:a()]", "a()").with_tag("fast");
        let untagged = TestIdentifier::test("[engine:e]/[method:b()]", "b()");

        assert!(TagFilter::include(["fast"]).apply(&fast).is_included());
        assert!(!TagFilter::include(["fast"]).apply(&untagged).is_included());
        assert!(!TagFilter::exclude(["fast"]).apply(&fast).is_included());
        assert!(TagFilter::exclude(["fast"]).apply(&untagged).is_included());
    }

    #[test]
    fn test_static_containers_pass_tag_filters() {
        let container = TestIdentifier::container("[engine:e]", "e");
        assert!(TagFilter::include(["fast"]).apply(&container).is_included());
    }

    #[test]
    fn test_dynamic_containers_are_judged_by_tags() {
        let template = TestIdentifier::container("[engine:e]/[test-template:sums(int)]", "sums(int)").with_tag("slow");
        let factory = TestIdentifier::container("[engine:e]/[test-factory:ops()]", "ops()");

        assert!(!TagFilter::exclude(["slow"]).apply(&template).is_included());
        assert!(TagFilter::exclude(["slow"]).apply(&factory).is_included());
        assert!(!TagFilter::include(["fast"]).apply(&factory).is_included());
        assert!(TagFilter::include(["slow"]).apply(&template).is_included());
    }
}
