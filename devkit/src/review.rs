//! Reasoning / code-review workflow: accumulate steps, report progress.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::session::SessionStore;
use crate::core::types::{Phase, Workflow};
use crate::core::validator::validate_step;
use crate::error::StepError;

/// Progress summary returned after each accepted review step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub thought_number: u32,
    /// Session-wide estimate, never lower than any step seen.
    pub total_thoughts: u32,
    pub next_thought_needed: bool,
    pub branches: Vec<String>,
    pub thought_history_length: usize,
}

impl ReviewSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    store: SessionStore,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip_all)]
    pub fn process(&mut self, args: &Value) -> Result<ReviewSummary, StepError> {
        let record = validate_step(args, Workflow::Review)?;
        let stored = self.store.append(record);
        let thought_number = stored.step;
        let next_thought_needed = stored.next_step_needed;
        debug!(
            step = thought_number,
            revision = stored.is_revision.unwrap_or(false),
            "review step accepted"
        );

        Ok(ReviewSummary {
            thought_number,
            total_thoughts: self.store.total_steps(),
            next_thought_needed,
            branches: self.store.branch_ids(),
            thought_history_length: self.store.history_len(),
        })
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.store.phase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::review_args;
    use serde_json::json;

    #[test]
    fn summary_tracks_history_and_total() {
        let mut session = ReviewSession::new();
        session.process(&review_args("scan", 1, 2, true)).expect("1");
        let summary = session
            .process(&review_args("deeper than planned", 3, 2, true))
            .expect("3");

        assert_eq!(
            summary,
            ReviewSummary {
                thought_number: 3,
                total_thoughts: 3,
                next_thought_needed: true,
                branches: vec![],
                thought_history_length: 2,
            }
        );
    }

    #[test]
    fn summary_serializes_with_wire_names() {
        let mut session = ReviewSession::new();
        let mut args = review_args("alt path", 2, 4, false);
        args["branchFromThought"] = json!(1);
        args["branchId"] = json!("alt");
        let summary = session.process(&args).expect("process");

        let value: Value = serde_json::from_str(&summary.to_json().expect("json")).expect("parse");
        assert_eq!(
            value,
            json!({
                "thoughtNumber": 2,
                "totalThoughts": 4,
                "nextThoughtNeeded": false,
                "branches": ["alt"],
                "thoughtHistoryLength": 0,
            })
        );
        assert_eq!(session.phase(), Phase::Terminal);
    }

    #[test]
    fn invalid_step_does_not_change_history() {
        let mut session = ReviewSession::new();
        session.process(&review_args("ok", 1, 2, true)).expect("1");
        let err = session
            .process(&json!({"thought": "", "thoughtNumber": 2}))
            .expect_err("invalid");
        assert!(err.is_validation());
        assert_eq!(session.store().history_len(), 1);
    }
}
