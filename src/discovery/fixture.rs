//! JSON fixtures for plans and event streams.
//!
//! A plan fixture lists identifiers parents-first:
//!
//! ```json
//! {
//!   "label": "Calculator",
//!   "identifiers": [
//!     { "unique_id": "[engine:e]", "display_name": "JUnit Jupiter", "kind": "container" },
//!     { "unique_id": "[engine:e]/[class:Calc]", "display_name": "Calc", "kind": "container",
//!       "source": { "class": { "class_name": "com.example.Calc" } } },
//!     { "unique_id": "[engine:e]/[class:Calc]/[method:adds()]", "display_name": "adds()", "kind": "test",
//!       "tags": ["fast"] }
//!   ]
//! }
//! ```
//!
//! An event fixture is an array of objects tagged by `event`: `plan_started`, `dynamic_test_registered`
//! (with an `identifier`), `started`, `skipped` (with a `reason`), `finished` (with a `status` and an optional
//! `cause`), `reporting_entry_published` and `plan_finished`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Deserialize;
use thiserror::Error;
use treebridge_core::{IdentifierKind, TestIdentifier, TestSource, UniqueId};

use crate::error::ProjectionError;
use crate::listener::{ExecutionEvent, TestExecutionResult};
use crate::notification::Cause;
use crate::plan::TestPlan;

#[derive(Debug, Error, Diagnostic)]
pub enum FixtureError {
    #[error("could not read fixture '{path}'")]
    #[diagnostic(code(treebridge::fixture::io), help("check that the file exists and is readable"))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed fixture: {message}")]
    #[diagnostic(
        code(treebridge::fixture::json),
        help("plan fixtures are objects with an `identifiers` array, event fixtures are arrays of events")
    )]
    Json {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("fixture '{path}' does not describe a valid test plan")]
    #[diagnostic(
        code(treebridge::fixture::plan),
        help("list identifiers parents-first; every parent must appear before its children")
    )]
    Plan {
        path: String,
        #[source]
        source: ProjectionError,
    },
}

impl FixtureError {
    fn json(name: &str, contents: &str, err: &serde_json::Error) -> Self {
        let offset = byte_offset(contents, err.line(), err.column());
        FixtureError::Json {
            message: err.to_string(),
            src: NamedSource::new(name, contents.to_string()),
            span: (offset, 0).into(),
        }
    }
}

// serde_json reports 1-based lines and columns
fn byte_offset(contents: &str, line: usize, column: usize) -> usize {
    let line_start: usize = contents
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(contents.len())
}

/// A parsed plan fixture.
#[derive(Debug, Clone)]
pub struct PlanFixture {
    pub label: String,
    pub plan: TestPlan,
}

#[derive(Debug, Deserialize)]
struct PlanDocument {
    #[serde(default)]
    label: String,
    identifiers: Vec<IdentifierDocument>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindDocument {
    Container,
    Test,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SourceDocument {
    Class {
        class_name: String,
    },
    Method {
        class_name: String,
        method_name: String,
        #[serde(default)]
        parameter_types: String,
    },
    Other(String),
}

#[derive(Debug, Deserialize)]
struct IdentifierDocument {
    unique_id: String,
    display_name: String,
    kind: KindDocument,
    /// Overrides the parent encoded in the unique ID.
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    legacy_reporting_name: Option<String>,
    #[serde(default)]
    source: Option<SourceDocument>,
    #[serde(default)]
    tags: Vec<String>,
}

impl IdentifierDocument {
    fn into_identifier(self) -> TestIdentifier {
        let kind = match self.kind {
            KindDocument::Container => IdentifierKind::Container,
            KindDocument::Test => IdentifierKind::Test,
        };
        let mut identifier = TestIdentifier::new(self.unique_id, self.display_name, kind);
        if let Some(parent) = self.parent {
            identifier = identifier.with_parent(Some(UniqueId::new(parent)));
        }
        if let Some(name) = self.legacy_reporting_name {
            identifier = identifier.with_legacy_reporting_name(name);
        }
        if let Some(source) = self.source {
            identifier = identifier.with_source(match source {
                SourceDocument::Class { class_name } => TestSource::Class { class_name },
                SourceDocument::Method {
                    class_name,
                    method_name,
                    parameter_types,
                } => TestSource::Method {
                    class_name,
                    method_name,
                    parameter_types,
                },
                SourceDocument::Other(other) => TestSource::Other(other),
            });
        }
        self.tags
            .into_iter()
            .fold(identifier, |identifier, tag| identifier.with_tag(tag))
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StatusDocument {
    #[default]
    Successful,
    Aborted,
    Failed,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum EventDocument {
    PlanStarted,
    PlanFinished,
    DynamicTestRegistered {
        identifier: IdentifierDocument,
    },
    Started {
        unique_id: String,
    },
    Skipped {
        unique_id: String,
        #[serde(default)]
        reason: String,
    },
    Finished {
        unique_id: String,
        #[serde(default)]
        status: StatusDocument,
        #[serde(default)]
        cause: Option<Cause>,
    },
    ReportingEntryPublished {
        unique_id: String,
        #[serde(default)]
        entries: BTreeMap<String, String>,
    },
}

impl From<EventDocument> for ExecutionEvent {
    fn from(document: EventDocument) -> Self {
        match document {
            EventDocument::PlanStarted => ExecutionEvent::PlanStarted,
            EventDocument::PlanFinished => ExecutionEvent::PlanFinished,
            EventDocument::DynamicTestRegistered { identifier } => {
                ExecutionEvent::DynamicTestRegistered(identifier.into_identifier())
            }
            EventDocument::Started { unique_id } => ExecutionEvent::Started(unique_id.into()),
            EventDocument::Skipped { unique_id, reason } => ExecutionEvent::Skipped {
                unique_id: unique_id.into(),
                reason,
            },
            EventDocument::Finished {
                unique_id,
                status,
                cause,
            } => ExecutionEvent::Finished {
                unique_id: unique_id.into(),
                result: match status {
                    StatusDocument::Successful => TestExecutionResult::Successful,
                    StatusDocument::Aborted => TestExecutionResult::Aborted(cause),
                    StatusDocument::Failed => TestExecutionResult::Failed(cause),
                },
            },
            EventDocument::ReportingEntryPublished { unique_id, entries } => {
                ExecutionEvent::ReportingEntryPublished {
                    unique_id: unique_id.into(),
                    entries,
                }
            }
        }
    }
}

/// Parse a plan fixture. `name` labels diagnostics.
pub fn parse_plan(name: &str, contents: &str) -> Result<PlanFixture, FixtureError> {
    let document: PlanDocument =
        serde_json::from_str(contents).map_err(|err| FixtureError::json(name, contents, &err))?;
    let plan = TestPlan::from_identifiers(
        document
            .identifiers
            .into_iter()
            .map(IdentifierDocument::into_identifier),
    )
    .map_err(|source| FixtureError::Plan {
        path: name.to_string(),
        source,
    })?;

    Ok(PlanFixture {
        label: document.label,
        plan,
    })
}

pub fn parse_events(name: &str, contents: &str) -> Result<Vec<ExecutionEvent>, FixtureError> {
    let documents: Vec<EventDocument> =
        serde_json::from_str(contents).map_err(|err| FixtureError::json(name, contents, &err))?;
    Ok(documents.into_iter().map(ExecutionEvent::from).collect())
}

pub fn load_plan(path: &Path) -> Result<PlanFixture, FixtureError> {
    let contents = read(path)?;
    parse_plan(&path.display().to_string(), &contents)
}

pub fn load_events(path: &Path) -> Result<Vec<ExecutionEvent>, FixtureError> {
    let contents = read(path)?;
    parse_events(&path.display().to_string(), &contents)
}

fn read(path: &Path) -> Result<String, FixtureError> {
    fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })
}
