//! Test-only helpers: scripted change sources, argument builders and a
//! throwaway git repository.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::io::changes::{ChangeSource, NameStatusEntry};

/// Change source answering from a fixed list of `(code, path, diff)` entries.
#[derive(Debug, Default)]
pub struct ScriptedChangeSource {
    entries: Vec<(String, String, String)>,
    listing_calls: AtomicUsize,
    diff_calls: AtomicUsize,
}

impl ScriptedChangeSource {
    pub fn new(entries: Vec<(&str, &str, &str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(code, path, diff)| (code.to_string(), path.to_string(), diff.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn diff_calls(&self) -> usize {
        self.diff_calls.load(Ordering::SeqCst)
    }
}

impl ChangeSource for ScriptedChangeSource {
    fn staged_entries(&self) -> Result<Vec<NameStatusEntry>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .entries
            .iter()
            .map(|(code, path, _)| NameStatusEntry {
                code: code.clone(),
                path: path.clone(),
            })
            .collect())
    }

    fn staged_diff(&self, path: &str) -> Result<String> {
        self.diff_calls.fetch_add(1, Ordering::SeqCst);
        self.entries
            .iter()
            .find(|(_, p, _)| p == path)
            .map(|(_, _, diff)| diff.clone())
            .ok_or_else(|| anyhow!("unknown path {path}"))
    }
}

/// Change source whose listing or one path's diff fails.
#[derive(Debug)]
pub struct FailingChangeSource {
    entries: Option<Vec<(String, String)>>,
    failing_path: String,
}

impl FailingChangeSource {
    /// The listing itself fails.
    pub fn listing() -> Self {
        Self {
            entries: None,
            failing_path: String::new(),
        }
    }

    /// The listing succeeds with `entries`; diffing `path` fails.
    pub fn diff_of(path: &str, entries: Vec<(&str, &str)>) -> Self {
        Self {
            entries: Some(
                entries
                    .into_iter()
                    .map(|(code, p)| (code.to_string(), p.to_string()))
                    .collect(),
            ),
            failing_path: path.to_string(),
        }
    }
}

impl ChangeSource for FailingChangeSource {
    fn staged_entries(&self) -> Result<Vec<NameStatusEntry>> {
        let Some(entries) = &self.entries else {
            bail!("fatal: not a git repository");
        };
        Ok(entries
            .iter()
            .map(|(code, path)| NameStatusEntry {
                code: code.clone(),
                path: path.clone(),
            })
            .collect())
    }

    fn staged_diff(&self, path: &str) -> Result<String> {
        if path == self.failing_path {
            bail!("fatal: bad object for {path}");
        }
        Ok(format!("diff --git a/{path} b/{path}"))
    }
}

/// Arguments for a valid `code_review` step.
pub fn review_args(thought: &str, step: u32, total: u32, next: bool) -> Value {
    json!({
        "thought": thought,
        "thoughtNumber": step,
        "totalThoughts": total,
        "nextThoughtNeeded": next,
    })
}

/// Arguments for a valid `commit` step with neutral guidance fields.
pub fn commit_args(thought: &str, step: u32, total: u32, next: bool) -> Value {
    let mut args = review_args(thought, step, total, next);
    args["critical_questions"] = json!("Is anything unstaged?");
    args["next_step"] = json!("Keep going.");
    args
}

/// Throwaway git repository for end-to-end collection tests.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn init() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp repo dir")?;
        let repo = Self { dir };
        repo.git(&["init", "-q"])?;
        repo.git(&["config", "user.email", "devkit@example.com"])?;
        repo.git(&["config", "user.name", "devkit tests"])?;
        repo.git(&["config", "commit.gpgsign", "false"])?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn stage(&self, rel: &str) -> Result<()> {
        self.git(&["add", "--", rel])
    }

    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.git(&["add", "-A"])?;
        self.git(&["commit", "-q", "-m", message])
    }

    pub fn git(&self, args: &[&str]) -> Result<()> {
        let status = Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .status()
            .with_context(|| format!("spawn git {}", args.join(" ")))?;
        if !status.success() {
            bail!("git {} failed: {status}", args.join(" "));
        }
        Ok(())
    }
}
