//! Failures reported by a single workflow step.

use thiserror::Error;

use crate::core::validator::ValidationErrors;

/// Why a step was not accepted.
///
/// Neither variant poisons the session: the rejected call leaves history and
/// draft exactly as they were.
#[derive(Debug, Error)]
pub enum StepError {
    /// Missing or mistyped arguments.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    /// The version-control collaborator failed while collecting changes.
    #[error("failed to fetch git changes: {0:#}")]
    Collect(anyhow::Error),
}

impl StepError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}
