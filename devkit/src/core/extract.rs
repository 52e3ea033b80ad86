//! Pattern-based extraction of commit signals from step text.
//!
//! Extraction is heuristic on purpose. The issue key and the commit
//! type/scope keep the first match of the session, while subject, body and
//! breaking-change note are replaced by every later match.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::Draft;

const SUBJECT_MARKERS: [&str; 2] = ["commit subject:", "commit message:"];
const BODY_MARKER: &str = "commit body:";
const BREAKING_MARKER: &str = "BREAKING CHANGE:";

static ISSUE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]+-[0-9]+").unwrap());

static COMMIT_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(feat|fix|docs|style|refactor|perf|test|build|ci|chore|revert)(\(([^)]+)\))?")
        .unwrap()
});

/// Fold the signals found in `content` into `draft`.
///
/// All five rules run on every call; none short-circuits another.
pub fn extract_signals(draft: &mut Draft, content: &str) {
    if draft.issue_key.is_none()
        && let Some(found) = ISSUE_KEY_RE.find(content)
    {
        draft.issue_key = Some(found.as_str().to_string());
    }

    if draft.commit_type.is_none()
        && let Some(caps) = COMMIT_TYPE_RE.captures(content)
    {
        draft.commit_type = caps.get(1).map(|m| m.as_str().to_string());
        draft.scope = caps.get(3).map(|m| m.as_str().to_string());
    }

    if let Some(subject) = subject_line(content) {
        draft.subject = Some(subject);
    }

    if let Some(body) = text_after(content, BODY_MARKER) {
        draft.body = Some(body);
    }

    if let Some(note) = text_after(content, BREAKING_MARKER) {
        draft.breaking_change = Some(note);
    }
}

/// Text after the first colon of the first line carrying a subject marker.
fn subject_line(content: &str) -> Option<String> {
    content
        .lines()
        .find(|line| {
            let lower = line.to_lowercase();
            SUBJECT_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .and_then(|line| line.split_once(':'))
        .map(|(_, rest)| rest.trim().to_string())
}

/// Everything after the first occurrence of `marker`, trimmed.
fn text_after(content: &str, marker: &str) -> Option<String> {
    content
        .split_once(marker)
        .map(|(_, rest)| rest.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_all(texts: &[&str]) -> Draft {
        let mut draft = Draft::default();
        for text in texts {
            extract_signals(&mut draft, text);
        }
        draft
    }

    #[test]
    fn keeps_first_issue_key() {
        let draft = extract_all(&["working on PROJ-123", "also touches OPS-9"]);
        assert_eq!(draft.issue_key.as_deref(), Some("PROJ-123"));
    }

    #[test]
    fn issue_key_needs_uppercase_and_digits() {
        let draft = extract_all(&["proj-123 and ABC- and -42"]);
        assert_eq!(draft.issue_key, None);
    }

    #[test]
    fn type_and_scope_lock_together_on_first_match() {
        let draft = extract_all(&["this is a refactor", "fix(auth): later"]);
        assert_eq!(draft.commit_type.as_deref(), Some("refactor"));
        assert_eq!(draft.scope, None);
    }

    #[test]
    fn type_with_scope() {
        let draft = extract_all(&["fix(auth): resolve token bug"]);
        assert_eq!(draft.commit_type.as_deref(), Some("fix"));
        assert_eq!(draft.scope.as_deref(), Some("auth"));
    }

    #[test]
    fn type_match_is_unanchored() {
        // "prefix" contains "fix"; the pattern is not word-bounded.
        let draft = extract_all(&["strip the prefix"]);
        assert_eq!(draft.commit_type.as_deref(), Some("fix"));
    }

    #[test]
    fn subject_marker_is_case_insensitive_and_latest_wins() {
        let draft = extract_all(&[
            "Commit Subject: first try",
            "notes\ncommit message:  second try  \nmore",
        ]);
        assert_eq!(draft.subject.as_deref(), Some("second try"));
    }

    #[test]
    fn subject_takes_text_after_first_colon_of_line() {
        let draft = extract_all(&["Plan: commit subject: tidy imports"]);
        assert_eq!(draft.subject.as_deref(), Some("commit subject: tidy imports"));
    }

    #[test]
    fn body_runs_to_end_of_content() {
        let draft = extract_all(&["intro\ncommit body:\n  line one\nline two\n\n"]);
        assert_eq!(draft.body.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn body_marker_is_case_sensitive() {
        let draft = extract_all(&["Commit Body: ignored"]);
        assert_eq!(draft.body, None);
    }

    #[test]
    fn breaking_change_latest_wins() {
        let draft = extract_all(&[
            "BREAKING CHANGE: drops v1",
            "nothing here",
            "BREAKING CHANGE: removes legacy endpoint ",
        ]);
        assert_eq!(
            draft.breaking_change.as_deref(),
            Some("removes legacy endpoint")
        );
    }

    #[test]
    fn rules_are_independent() {
        let draft = extract_all(&[
            "feat(api) for PROJ-7\ncommit subject: add paging\ncommit body: adds cursors\n\
             BREAKING CHANGE: offset param removed",
        ]);
        assert_eq!(draft.issue_key.as_deref(), Some("PROJ-7"));
        assert_eq!(draft.commit_type.as_deref(), Some("feat"));
        assert_eq!(draft.scope.as_deref(), Some("api"));
        assert_eq!(draft.subject.as_deref(), Some("add paging"));
        assert_eq!(
            draft.body.as_deref(),
            Some("adds cursors\nBREAKING CHANGE: offset param removed")
        );
        assert_eq!(draft.breaking_change.as_deref(), Some("offset param removed"));
    }
}
