//! Deterministic Conventional Commit assembly from a [`Draft`].

use crate::core::types::Draft;

pub const DEFAULT_TYPE: &str = "chore";
pub const DEFAULT_SUBJECT: &str = "update code";

/// Render the commit message for `draft`.
///
/// Layout: header, then `Ref: <issue>`, body and `BREAKING CHANGE: <note>`,
/// each present section separated by exactly one blank line. Empty values
/// count as unset.
pub fn compose_message(draft: &Draft) -> String {
    let breaking = non_empty(&draft.breaking_change);

    let mut header = non_empty(&draft.commit_type)
        .unwrap_or(DEFAULT_TYPE)
        .to_string();
    if let Some(scope) = non_empty(&draft.scope) {
        header.push('(');
        header.push_str(scope);
        header.push(')');
    }
    if breaking.is_some() {
        header.push('!');
    }
    header.push_str(": ");
    header.push_str(non_empty(&draft.subject).unwrap_or(DEFAULT_SUBJECT));

    let mut sections = vec![header];
    if let Some(issue) = non_empty(&draft.issue_key) {
        sections.push(format!("Ref: {issue}"));
    }
    if let Some(body) = non_empty(&draft.body) {
        sections.push(body.to_string());
    }
    if let Some(note) = breaking {
        sections.push(format!("BREAKING CHANGE: {note}"));
    }
    sections.join("\n\n")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn empty_draft_uses_defaults() {
        assert_eq!(compose_message(&Draft::default()), "chore: update code");
    }

    #[test]
    fn header_with_scope_and_subject() {
        let draft = Draft {
            commit_type: set("fix"),
            scope: set("auth"),
            subject: set("handle refresh token edge case"),
            ..Draft::default()
        };
        assert_eq!(
            compose_message(&draft),
            "fix(auth): handle refresh token edge case"
        );
    }

    #[test]
    fn breaking_change_marks_header_and_adds_footer() {
        let draft = Draft {
            commit_type: set("feat"),
            breaking_change: set("removes legacy endpoint"),
            ..Draft::default()
        };
        assert_eq!(
            compose_message(&draft),
            "feat!: update code\n\nBREAKING CHANGE: removes legacy endpoint"
        );
    }

    #[test]
    fn full_message_section_order() {
        let draft = Draft {
            issue_key: set("PROJ-42"),
            commit_type: set("feat"),
            scope: set("api"),
            subject: set("add paging"),
            body: set("Adds cursor pagination.\n\nKeeps offsets for now."),
            breaking_change: set("page size defaults to 50"),
        };
        assert_eq!(
            compose_message(&draft),
            "feat(api)!: add paging\n\n\
             Ref: PROJ-42\n\n\
             Adds cursor pagination.\n\nKeeps offsets for now.\n\n\
             BREAKING CHANGE: page size defaults to 50"
        );
    }

    #[test]
    fn empty_values_leave_no_blank_sections() {
        let draft = Draft {
            subject: set(""),
            body: set(""),
            breaking_change: set(""),
            issue_key: set("OPS-1"),
            ..Draft::default()
        };
        assert_eq!(compose_message(&draft), "chore: update code\n\nRef: OPS-1");
    }
}
