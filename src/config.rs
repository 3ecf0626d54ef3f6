//! Run configuration for the projection
//!
//! Resolved once per run, before the description tree is built.

use std::collections::BTreeMap;

use crate::naming::{NameSynthesizer, NamingMode};
use crate::plan::ParentPolicy;
use crate::tree::DescriptionLayout;

/// Configuration parameter that switches the platform to parallel execution.
pub const PARALLEL_EXECUTION_ENABLED: &str = "junit.jupiter.execution.parallel.enabled";

/// Projection configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunConfig {
    /// How containers are named
    pub naming: NamingMode,
    /// Name tests after their legacy reporting name (isolated method runs)
    pub legacy_format: bool,
    /// Shape of the description tree
    pub layout: DescriptionLayout,
    /// Logical parent resolution for dynamic nodes
    pub parent_policy: ParentPolicy,
    /// Platform configuration parameters, passed through untouched
    pub configuration_parameters: BTreeMap<String, String>,
}

impl RunConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_naming(mut self, naming: NamingMode) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_legacy_format(mut self, legacy_format: bool) -> Self {
        self.legacy_format = legacy_format;
        self
    }

    pub fn with_layout(mut self, layout: DescriptionLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_parent_policy(mut self, policy: ParentPolicy) -> Self {
        self.parent_policy = policy;
        self
    }

    /// Merge parameters parsed from a `key=value,key=value` string; later keys win.
    pub fn with_configuration_parameters(mut self, properties: &str) -> Self {
        self.configuration_parameters.extend(parse_properties(properties));
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configuration_parameters.insert(key.into(), value.into());
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.configuration_parameters.get(key).map(String::as_str)
    }

    pub fn is_parallel_execution_enabled(&self) -> bool {
        self.parameter(PARALLEL_EXECUTION_ENABLED) == Some("true")
    }

    /// The name synthesizer this configuration selects.
    pub fn synthesizer(&self) -> NameSynthesizer {
        NameSynthesizer::new(self.naming, self.legacy_format)
    }
}

/// Parse `key=value` pairs separated by commas.
///
/// Entries that do not split into exactly one key and one value are dropped. Whitespace around keys and values
/// is trimmed.
pub fn parse_properties(properties: &str) -> BTreeMap<String, String> {
    properties
        .split(',')
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.split('=').collect();
            match parts.as_slice() {
                [key, value] if !key.trim().is_empty() => Some((key.trim().to_string(), value.trim().to_string())),
                _ => None,
            }
        })
        .collect()
}
