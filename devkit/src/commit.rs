//! Commit-message workflow: one session folding staged changes and step
//! signals into a Conventional Commit message.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::core::compose::compose_message;
use crate::core::extract::extract_signals;
use crate::core::session::SessionStore;
use crate::core::types::{ChangeRecord, ChangeStatus, Draft, Phase, Workflow};
use crate::core::validator::validate_step;
use crate::error::StepError;
use crate::io::changes::{ChangeSource, collect_changes};

/// A staged path as surfaced in a step reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub status: ChangeStatus,
    pub path: String,
}

/// Outcome of one accepted commit step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitReply {
    /// More steps expected. `staged` is set on the step that collected changes.
    Continue {
        step: u32,
        staged: Option<Vec<StagedFile>>,
    },
    /// Terminal step reached; `message` is the composed commit message.
    Completed { message: String },
}

impl fmt::Display for CommitReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue { step, staged } => {
                write!(f, "Thought {step} processed. Proceed with your next thought.")?;
                match staged.as_deref() {
                    None => Ok(()),
                    Some([]) => write!(f, "\n\nNo staged changes found."),
                    Some(files) => {
                        write!(f, "\n\nStaged changes ({}):", files.len())?;
                        for file in files {
                            write!(f, "\n{}\t{}", file.status, file.path)?;
                        }
                        Ok(())
                    }
                }
            }
            Self::Completed { message } => f.write_str(message),
        }
    }
}

/// State of one commit-drafting session.
#[derive(Debug, Clone, Default)]
pub struct CommitSession {
    store: SessionStore,
    draft: Draft,
    /// `None` until a step-1 record has collected successfully.
    changes: Option<Vec<ChangeRecord>>,
}

impl CommitSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, collect (first step only), append, extract and, on the
    /// terminal step, compose.
    ///
    /// A rejected step (invalid arguments or failed collection) leaves the
    /// session untouched.
    #[instrument(skip_all)]
    pub fn process<S: ChangeSource + ?Sized>(
        &mut self,
        args: &Value,
        source: &S,
    ) -> Result<CommitReply, StepError> {
        let record = validate_step(args, Workflow::Commit)?;

        let staged = if record.step == 1 && self.changes.is_none() {
            let changes = collect_changes(source).map_err(StepError::Collect)?;
            let staged = changes
                .iter()
                .map(|change| StagedFile {
                    status: change.status.clone(),
                    path: change.path.clone(),
                })
                .collect();
            self.changes = Some(changes);
            Some(staged)
        } else {
            None
        };

        extract_signals(&mut self.draft, &record.content);
        let stored = self.store.append(record);
        let step = stored.step;
        debug!(step, branch = stored.branch_id.as_deref(), "commit step accepted");

        if stored.is_terminal() {
            let message = compose_message(&self.draft);
            info!(step, header = message.lines().next(), "commit message composed");
            return Ok(CommitReply::Completed { message });
        }
        Ok(CommitReply::Continue { step, staged })
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Staged changes collected at step 1 (empty before collection).
    pub fn changes(&self) -> &[ChangeRecord] {
        self.changes.as_deref().unwrap_or_default()
    }

    pub fn has_collected(&self) -> bool {
        self.changes.is_some()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.store.phase()
    }
}
