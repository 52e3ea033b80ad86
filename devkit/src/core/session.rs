//! Append-only step history with branch indexing.

use std::collections::BTreeMap;

use crate::core::types::{Phase, StepRecord};

/// Ordered history and branch index for one session.
///
/// Branch records (both `branch_from` and `branch_id` set) go to the branch
/// index; every other record goes to the main history. Nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    history: Vec<StepRecord>,
    branches: BTreeMap<String, Vec<StepRecord>>,
    total_steps: u32,
    phase: Phase,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a record, returning it as stored (with its total adjusted).
    ///
    /// The session total never decreases and is always at least every step
    /// index seen. Records arriving after the terminal step are still accepted.
    pub fn append(&mut self, mut record: StepRecord) -> &StepRecord {
        if record.step > record.total_steps {
            record.total_steps = record.step;
        }
        self.total_steps = self.total_steps.max(record.total_steps);
        self.phase = if record.is_terminal() {
            Phase::Terminal
        } else {
            Phase::Accumulating
        };

        let branch_key = if record.is_branch() {
            record.branch_id.clone()
        } else {
            None
        };
        match branch_key {
            Some(id) => {
                let branch = self.branches.entry(id).or_default();
                branch.push(record);
                &branch[branch.len() - 1]
            }
            None => {
                self.history.push(record);
                &self.history[self.history.len() - 1]
            }
        }
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Branch identifiers in lexicographic order.
    pub fn branch_ids(&self) -> Vec<String> {
        self.branches.keys().cloned().collect()
    }

    pub fn branch(&self, id: &str) -> Option<&[StepRecord]> {
        self.branches.get(id).map(Vec::as_slice)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: u32, total: u32, next: bool) -> StepRecord {
        StepRecord {
            content: format!("step {step}"),
            step,
            total_steps: total,
            next_step_needed: next,
            is_revision: None,
            revises_step: None,
            branch_from: None,
            branch_id: None,
            needs_more_steps: None,
            analysis: None,
            critical_questions: None,
            next_step: None,
        }
    }

    fn branch_record(step: u32, from: Option<u32>, id: Option<&str>) -> StepRecord {
        StepRecord {
            branch_from: from,
            branch_id: id.map(str::to_string),
            ..record(step, 5, true)
        }
    }

    #[test]
    fn raises_record_total_to_step_index() {
        let mut store = SessionStore::new();
        let stored = store.append(record(4, 2, true));
        assert_eq!(stored.total_steps, 4);
        assert_eq!(store.total_steps(), 4);
    }

    #[test]
    fn session_total_is_non_decreasing() {
        let mut store = SessionStore::new();
        let mut seen = 0;
        for (step, total) in [(1, 5), (2, 3), (7, 1), (3, 2)] {
            store.append(record(step, total, true));
            assert!(store.total_steps() >= seen, "total went down");
            assert!(store.total_steps() >= step);
            seen = store.total_steps();
        }
        assert_eq!(store.total_steps(), 7);
    }

    #[test]
    fn branch_needs_origin_and_id() {
        let mut store = SessionStore::new();
        store.append(record(1, 3, true));
        store.append(branch_record(2, Some(1), Some("alt")));
        store.append(branch_record(2, None, Some("orphan")));
        store.append(branch_record(2, Some(1), None));

        assert_eq!(store.branch_ids(), vec!["alt".to_string()]);
        assert_eq!(store.history_len(), 3);
    }

    #[test]
    fn branch_preserves_arrival_order() {
        let mut store = SessionStore::new();
        store.append(branch_record(3, Some(1), Some("b")));
        store.append(branch_record(2, Some(1), Some("a")));
        store.append(branch_record(2, Some(1), Some("b")));

        let steps: Vec<u32> = store
            .branch("b")
            .expect("branch b")
            .iter()
            .map(|r| r.step)
            .collect();
        assert_eq!(steps, vec![3, 2]);
        assert_eq!(store.branch_ids(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.history_len(), 0);
    }

    #[test]
    fn history_keeps_arrival_not_step_order() {
        let mut store = SessionStore::new();
        store.append(record(2, 3, true));
        store.append(record(1, 3, true));
        let steps: Vec<u32> = store.history().iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![2, 1]);
    }

    #[test]
    fn phase_follows_continuation_flag() {
        let mut store = SessionStore::new();
        assert_eq!(store.phase(), Phase::New);
        store.append(record(1, 2, true));
        assert_eq!(store.phase(), Phase::Accumulating);
        store.append(record(2, 2, false));
        assert_eq!(store.phase(), Phase::Terminal);

        // Not final: later records are still accepted.
        store.append(record(3, 3, true));
        assert_eq!(store.phase(), Phase::Accumulating);
        assert_eq!(store.history_len(), 3);
    }
}
