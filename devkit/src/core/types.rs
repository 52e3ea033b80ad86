//! Shared deterministic types for the session engine.
//!
//! These types define stable contracts between core components. They should not
//! depend on external state or I/O and must remain deterministic across runs.

use std::fmt;

/// Which chain-of-thought workflow a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    /// Conventional commit drafting (`commit` tool).
    Commit,
    /// Free-form reasoning / code review (`code_review` tool).
    Review,
}

/// One validated unit of submitted reasoning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub content: String,
    /// 1-based step index.
    pub step: u32,
    /// Declared total estimate; raised to `step` when exceeded.
    pub total_steps: u32,
    /// `false` marks the session terminal.
    pub next_step_needed: bool,
    pub is_revision: Option<bool>,
    pub revises_step: Option<u32>,
    pub branch_from: Option<u32>,
    pub branch_id: Option<String>,
    pub needs_more_steps: Option<bool>,
    pub analysis: Option<String>,
    /// Required for the commit workflow, ignored by review.
    pub critical_questions: Option<String>,
    /// Required for the commit workflow, ignored by review.
    pub next_step: Option<String>,
}

impl StepRecord {
    /// True if the record both names a branch and the step it diverges from.
    pub fn is_branch(&self) -> bool {
        self.branch_from.is_some() && self.branch_id.is_some()
    }

    pub fn is_terminal(&self) -> bool {
        !self.next_step_needed
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No record accepted yet.
    #[default]
    New,
    Accumulating,
    /// The last accepted record had `next_step_needed == false`.
    Terminal,
}

/// Semantic status of a staged change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    /// Any status code git reports that has no mapping (`T`, `U`, `X`, ...).
    Other(String),
}

impl ChangeStatus {
    /// Map a raw name-status code using its first character (`R100` -> Renamed).
    pub fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => Self::Added,
            Some('M') => Self::Modified,
            Some('D') => Self::Deleted,
            Some('R') => Self::Renamed,
            Some('C') => Self::Copied,
            _ => Self::Other(code.to_string()),
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => f.write_str("Added"),
            Self::Modified => f.write_str("Modified"),
            Self::Deleted => f.write_str("Deleted"),
            Self::Renamed => f.write_str("Renamed"),
            Self::Copied => f.write_str("Copied"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// A staged file observed by the change collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: String,
    pub status: ChangeStatus,
    /// Unified diff text for `path`.
    pub diff: String,
    /// Last path segment of `path`.
    pub filename: String,
}

/// Commit signals accumulated across the steps of one session.
///
/// `issue_key` and `commit_type`/`scope` are set once; `subject`, `body` and
/// `breaking_change` are overwritten by every later match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub issue_key: Option<String>,
    pub commit_type: Option<String>,
    pub scope: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub breaking_change: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_by_first_character() {
        assert_eq!(ChangeStatus::from_code("A"), ChangeStatus::Added);
        assert_eq!(ChangeStatus::from_code("M"), ChangeStatus::Modified);
        assert_eq!(ChangeStatus::from_code("D"), ChangeStatus::Deleted);
        assert_eq!(ChangeStatus::from_code("R100"), ChangeStatus::Renamed);
        assert_eq!(ChangeStatus::from_code("C075"), ChangeStatus::Copied);
    }

    #[test]
    fn unknown_status_passes_through() {
        let status = ChangeStatus::from_code("T");
        assert_eq!(status, ChangeStatus::Other("T".to_string()));
        assert_eq!(status.to_string(), "T");
        assert_eq!(ChangeStatus::from_code(""), ChangeStatus::Other(String::new()));
    }

    #[test]
    fn branch_requires_origin_and_id() {
        let mut record = StepRecord {
            content: "alt".to_string(),
            step: 2,
            total_steps: 3,
            next_step_needed: true,
            is_revision: None,
            revises_step: None,
            branch_from: None,
            branch_id: Some("alt-1".to_string()),
            needs_more_steps: None,
            analysis: None,
            critical_questions: None,
            next_step: None,
        };
        assert!(!record.is_branch());
        record.branch_from = Some(1);
        assert!(record.is_branch());
    }
}
