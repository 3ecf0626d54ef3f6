//! A notifier that records every call.

use std::fmt;

use serde::Serialize;

use super::{Cause, Failure, RunNotifier};
use crate::tree::Description;

/// One recorded callback. Descriptions are captured by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    SuiteStarted {
        name: String,
    },
    Started {
        name: String,
    },
    Ignored {
        name: String,
    },
    Failure {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        cause: Option<Cause>,
    },
    AssumptionFailed {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        cause: Option<Cause>,
    },
    Finished {
        name: String,
    },
    SuiteFinished {
        name: String,
    },
}

impl Notification {
    pub fn name(&self) -> &str {
        match self {
            Notification::SuiteStarted { name }
            | Notification::Started { name }
            | Notification::Ignored { name }
            | Notification::Failure { name, .. }
            | Notification::AssumptionFailed { name, .. }
            | Notification::Finished { name }
            | Notification::SuiteFinished { name } => name,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Notification::SuiteStarted { .. } => "suite started",
            Notification::Started { .. } => "started",
            Notification::Ignored { .. } => "ignored",
            Notification::Failure { .. } => "failure",
            Notification::AssumptionFailed { .. } => "assumption failed",
            Notification::Finished { .. } => "finished",
            Notification::SuiteFinished { .. } => "suite finished",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.name())?;
        match self {
            Notification::Failure { cause: Some(cause), .. }
            | Notification::AssumptionFailed { cause: Some(cause), .. } => write!(f, " ({cause})"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Vec<Notification>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_notifications(self) -> Vec<Notification> {
        self.notifications
    }

    /// Recorded calls as `"<event> <name>"` lines.
    pub fn log(&self) -> Vec<String> {
        self.notifications.iter().map(ToString::to_string).collect()
    }
}

impl RunNotifier for RecordingNotifier {
    fn fire_test_suite_started(&mut self, description: &Description) {
        self.notifications.push(Notification::SuiteStarted {
            name: description.display_name(),
        });
    }

    fn fire_test_started(&mut self, description: &Description) {
        self.notifications.push(Notification::Started {
            name: description.display_name(),
        });
    }

    fn fire_test_ignored(&mut self, description: &Description) {
        self.notifications.push(Notification::Ignored {
            name: description.display_name(),
        });
    }

    fn fire_test_failure(&mut self, failure: &Failure<'_>) {
        self.notifications.push(Notification::Failure {
            name: failure.description.display_name(),
            cause: failure.cause.cloned(),
        });
    }

    fn fire_test_assumption_failed(&mut self, failure: &Failure<'_>) {
        self.notifications.push(Notification::AssumptionFailed {
            name: failure.description.display_name(),
            cause: failure.cause.cloned(),
        });
    }

    fn fire_test_finished(&mut self, description: &Description) {
        self.notifications.push(Notification::Finished {
            name: description.display_name(),
        });
    }

    fn fire_test_suite_finished(&mut self, description: &Description) {
        self.notifications.push(Notification::SuiteFinished {
            name: description.display_name(),
        });
    }
}
