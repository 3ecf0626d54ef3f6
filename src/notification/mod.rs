//! Legacy runner notifications.
//!
//! [`RunNotifier`] is the callback surface of the legacy runner. The projection is its only producer: every call
//! carries a [`Description`] owned by the description tree, borrowed for the duration of the call.

pub mod console;
pub mod filtered;
pub mod recording;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::Description;

pub use console::ConsoleNotifier;
pub use filtered::FilteredNotifier;
pub use recording::{Notification, RecordingNotifier};

/// The error a test failed or was aborted with, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// Fully-qualified type of the error, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub message: String,
}

impl Cause {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{kind}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A failed or aborted test together with its cause.
#[derive(Debug, Clone, Copy)]
pub struct Failure<'a> {
    pub description: &'a Description,
    pub cause: Option<&'a Cause>,
}

impl<'a> Failure<'a> {
    pub fn new(description: &'a Description, cause: Option<&'a Cause>) -> Self {
        Self { description, cause }
    }

    pub fn message(&self) -> Option<&str> {
        self.cause.map(|cause| cause.message.as_str())
    }
}

/// Callbacks of the legacy runner.
pub trait RunNotifier {
    /// Called once before any test event of a run
    fn fire_test_suite_started(&mut self, _description: &Description) {}

    fn fire_test_started(&mut self, description: &Description);

    fn fire_test_ignored(&mut self, description: &Description);

    fn fire_test_failure(&mut self, failure: &Failure<'_>);

    /// Called when a test was aborted because an assumption did not hold
    fn fire_test_assumption_failed(&mut self, failure: &Failure<'_>);

    fn fire_test_finished(&mut self, description: &Description);

    /// Called once after every test event of a run
    fn fire_test_suite_finished(&mut self, _description: &Description) {}
}

impl<N: RunNotifier + ?Sized> RunNotifier for &mut N {
    fn fire_test_suite_started(&mut self, description: &Description) {
        (**self).fire_test_suite_started(description);
    }

    fn fire_test_started(&mut self, description: &Description) {
        (**self).fire_test_started(description);
    }

    fn fire_test_ignored(&mut self, description: &Description) {
        (**self).fire_test_ignored(description);
    }

    fn fire_test_failure(&mut self, failure: &Failure<'_>) {
        (**self).fire_test_failure(failure);
    }

    fn fire_test_assumption_failed(&mut self, failure: &Failure<'_>) {
        (**self).fire_test_assumption_failed(failure);
    }

    fn fire_test_finished(&mut self, description: &Description) {
        (**self).fire_test_finished(description);
    }

    fn fire_test_suite_finished(&mut self, description: &Description) {
        (**self).fire_test_suite_finished(description);
    }
}
