//! Projection errors.
//!
//! Both variants are fatal to a run: they mean a lookup or registration happened out of order, which is a
//! correlation bug rather than a test outcome. Test failures never travel through this type.

use thiserror::Error;
use treebridge_core::UniqueId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("no node registered for unique id '{unique_id}'")]
    NotFound { unique_id: UniqueId },

    #[error("invalid state for '{unique_id}': {reason}")]
    InvalidState { unique_id: UniqueId, reason: String },
}

impl ProjectionError {
    pub fn not_found(unique_id: &UniqueId) -> Self {
        Self::NotFound {
            unique_id: unique_id.clone(),
        }
    }

    pub fn invalid_state(unique_id: &UniqueId, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            unique_id: unique_id.clone(),
            reason: reason.into(),
        }
    }

    /// The unique ID the failed operation was about.
    pub fn unique_id(&self) -> &UniqueId {
        match self {
            ProjectionError::NotFound { unique_id } | ProjectionError::InvalidState { unique_id, .. } => unique_id,
        }
    }
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;
