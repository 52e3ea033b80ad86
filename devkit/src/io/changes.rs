//! Staged-change collection behind the [`ChangeSource`] seam.
//!
//! The commit workflow needs the staged changes exactly as version control
//! reports them. [`Git`](crate::io::git::Git) is the production source; tests
//! use scripted sources that never spawn processes.

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::types::{ChangeRecord, ChangeStatus};

/// One `<status>\t<path>` entry of a name-status listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameStatusEntry {
    /// Raw status code (`M`, `A`, `R100`, ...).
    pub code: String,
    /// Path of the change; the destination path for renames and copies.
    pub path: String,
}

/// Version-control collaborator consulted by the change collector.
pub trait ChangeSource {
    /// List the currently staged changes.
    fn staged_entries(&self) -> Result<Vec<NameStatusEntry>>;

    /// Unified diff text of one staged path.
    fn staged_diff(&self, path: &str) -> Result<String>;
}

/// Query `source` for every staged change and its diff.
///
/// All-or-nothing: the first failing query aborts collection and nothing
/// gathered so far is returned.
#[instrument(skip_all)]
pub fn collect_changes<S: ChangeSource + ?Sized>(source: &S) -> Result<Vec<ChangeRecord>> {
    let entries = source.staged_entries().context("list staged changes")?;
    let mut changes = Vec::with_capacity(entries.len());
    for entry in entries {
        let diff = source
            .staged_diff(&entry.path)
            .with_context(|| format!("diff staged path {}", entry.path))?;
        changes.push(ChangeRecord {
            filename: file_name(&entry.path).to_string(),
            status: ChangeStatus::from_code(&entry.code),
            path: entry.path,
            diff,
        });
    }
    debug!(count = changes.len(), "collected staged changes");
    Ok(changes)
}

/// Parse `git diff --name-status -z` output.
///
/// Fields are NUL-separated and unquoted: a status code, then one path, or
/// source and destination paths for renames and copies (the destination is
/// kept). A trailing incomplete entry is dropped.
pub fn parse_name_status(output: &str) -> Vec<NameStatusEntry> {
    let mut fields = output.split('\0');
    let mut entries = Vec::new();
    while let Some(code) = fields.next() {
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        let path = if code.starts_with(['R', 'C']) {
            fields.next().and_then(|_source| fields.next())
        } else {
            fields.next()
        };
        match path {
            Some(path) if !path.is_empty() => entries.push(NameStatusEntry {
                code: code.to_string(),
                path: path.to_string(),
            }),
            _ => break,
        }
    }
    entries
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
