//! Identifier model shared by the treebridge projection engine.
//!
//! This crate is intentionally small and dependency-free. It describes the nodes of a discovered test plan:
//! - [`UniqueId`]: the platform's segment-encoded identifier (`[engine:x]/[class:y]/[method:z()]`),
//! - [`TestIdentifier`]: an immutable plan node (container or test) with its names and source,
//! - [`segments`]: the registry of short-ID markers that flag dynamically generated nodes.
//!
//! ## Notes
//!
//! - No IO and no global state. Everything here is a plain value.
//! - Whether a node is dynamic is decided once, when the identifier is constructed, and cached on the value.
//!
//! ## Examples
//! ```rust
//! use treebridge_core::{TestIdentifier, UniqueId};
//!
//! let id = UniqueId::new("[engine:junit-jupiter]/[class:Calc]/[test-template:adds(int)]");
//! let template = TestIdentifier::container(id, "adds(int)");
//! assert!(template.is_dynamic());
//! assert_eq!(template.short_id(), "[test-template:adds(int)]");
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod identifier;
pub mod ids;
pub mod segments;
pub mod source;

pub use identifier::{IdentifierKind, TestIdentifier};
pub use ids::{SEGMENT_SEPARATOR, UniqueId};
pub use segments::SegmentKind;
pub use source::TestSource;
