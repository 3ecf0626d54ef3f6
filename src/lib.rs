#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Treebridge: test-plan projection for legacy runners
//!
//! Modern test platforms discover a deep, growing tree of containers and tests; legacy runners only understand a
//! suite of named tests and a handful of lifecycle callbacks. This crate bridges the two:
//!
//! - [`plan`]: the discovered test plan and a logical view that regroups dynamically generated nodes,
//! - [`naming`]: names for every projected node, including folded names for dynamic tests,
//! - [`tree`]: the legacy description tree, extended while tests are registered at execution time,
//! - [`listener`]: correlation of execution events with descriptions, driving a [`notification::RunNotifier`],
//! - [`discovery`]: post-discovery filters (sharding, tags) and JSON fixtures,
//! - [`runner`]: a facade tying a plan, its tree and an event stream together.
//!
//! The identifier model lives in the dependency-free `treebridge_core` crate and is re-exported here.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The crate denies
//!   `clippy::unwrap_used` and `clippy::expect_used` outside test builds. Correlation failures surface as
//!   [`error::ProjectionError`].
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod listener;
pub mod naming;
pub mod notification;
pub mod plan;
pub mod runner;
pub mod tree;

pub use treebridge_core::{IdentifierKind, SegmentKind, TestIdentifier, TestSource, UniqueId};

pub use config::RunConfig;
pub use error::{ProjectionError, ProjectionResult};
pub use listener::{ExecutionEvent, ExecutionListener, ProjectionListener, TestExecutionResult};
pub use naming::{NameSynthesizer, NamingMode};
pub use notification::{Cause, Failure, RunNotifier};
pub use plan::{ParentPolicy, PlanQueries, PlanView, TestPlan};
pub use runner::ProjectionRunner;
pub use tree::{Description, DescriptionId, DescriptionKind, DescriptionLayout, DescriptionTree};
