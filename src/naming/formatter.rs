//! Name formatting for legacy runners.
//!
//! Two flavours:
//! - display format: the platform's display name with formatting artifacts removed, safe for legacy reports
//!   and for report tooling that turns test names into file names,
//! - legacy format: a method-style name derived from the legacy reporting name, for isolated method runs where
//!   the legacy runner matches tests by raw method name.

use treebridge_core::TestIdentifier;

/// Format an identifier's name.
pub fn format(identifier: &TestIdentifier, legacy_format: bool) -> String {
    if legacy_format {
        if let Some(name) = format_legacy_name(identifier.legacy_reporting_name()) {
            return name;
        }
    }
    format_display_name(identifier.display_name())
}

/// Clean up a display name: drop empty parameter lists, turn remaining parentheses into brackets and remove
/// quotation marks.
pub fn format_display_name(display_name: &str) -> String {
    display_name
        .replace("()", "")
        .replace('(', "[")
        .replace(')', "]")
        .replace('"', "")
}

/// Derive a method-style name from a legacy reporting name.
///
/// The parameter list is cut off; a trailing invocation index such as `[1]` is kept so that invocations of the
/// same method stay distinguishable. Returns `None` when the name has no parameter list.
pub fn format_legacy_name(legacy_reporting_name: &str) -> Option<String> {
    let param_start = legacy_reporting_name.find('(')?;
    let (method, parameters) = legacy_reporting_name.split_at(param_start);

    match parameters.rfind('[') {
        Some(index_start) => Some(format!("{method}{}", &parameters[index_start..])),
        None => Some(method.to_string()),
    }
}
