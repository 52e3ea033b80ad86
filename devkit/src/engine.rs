//! Entry points shared by every transport: one registry per workflow plus
//! the version-control collaborator.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::commit::{CommitReply, CommitSession};
use crate::core::types::Workflow;
use crate::error::StepError;
use crate::io::changes::ChangeSource;
use crate::registry::{SessionRegistry, session_id_from_args};
use crate::review::{ReviewSession, ReviewSummary};

pub struct Engine {
    commits: SessionRegistry<CommitSession>,
    reviews: SessionRegistry<ReviewSession>,
    source: Arc<dyn ChangeSource + Send + Sync>,
}

impl Engine {
    pub fn new(source: impl ChangeSource + Send + Sync + 'static) -> Self {
        Self {
            commits: SessionRegistry::new(),
            reviews: SessionRegistry::new(),
            source: Arc::new(source),
        }
    }

    /// Process one `commit` call inside the selected session's critical section.
    #[instrument(skip_all)]
    pub fn commit_step(&self, args: &Value) -> Result<CommitReply, StepError> {
        let id = session_id_from_args(args)?;
        let source = self.source.as_ref();
        self.commits
            .with_session(&id, |session| session.process(args, source))
    }

    /// Process one `code_review` call inside the selected session's critical section.
    #[instrument(skip_all)]
    pub fn review_step(&self, args: &Value) -> Result<ReviewSummary, StepError> {
        let id = session_id_from_args(args)?;
        self.reviews.with_session(&id, |session| session.process(args))
    }

    /// Drop session `id` from each of `workflows`.
    ///
    /// Returns the workflows that actually held a session under `id`.
    pub fn reset_session(&self, id: &str, workflows: &[Workflow]) -> Vec<Workflow> {
        let dropped: Vec<Workflow> = workflows
            .iter()
            .copied()
            .filter(|workflow| match workflow {
                Workflow::Commit => self.commits.reset(id),
                Workflow::Review => self.reviews.reset(id),
            })
            .collect();
        info!(session = id, dropped = dropped.len(), "session reset");
        dropped
    }

    pub fn commits(&self) -> &SessionRegistry<CommitSession> {
        &self.commits
    }

    pub fn reviews(&self) -> &SessionRegistry<ReviewSession> {
        &self.reviews
    }
}
