//! Git adapter for the change collector.
//!
//! Every git invocation goes through [`run_with_timeout`] so a hung git
//! process cannot hold a session's critical section indefinitely.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, instrument, warn};

use crate::io::changes::{ChangeSource, NameStatusEntry, parse_name_status};
use crate::io::config::GitConfig;
use crate::io::process::{CommandOutput, run_with_timeout};

pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1_000_000;

/// Wrapper for executing git queries in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            timeout: DEFAULT_GIT_TIMEOUT,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }

    /// Build from config; `fallback_workdir` is used when `git.workdir` is unset.
    pub fn from_config(cfg: &GitConfig, fallback_workdir: &Path) -> Self {
        let workdir = cfg
            .workdir
            .clone()
            .unwrap_or_else(|| fallback_workdir.to_path_buf());
        Self::new(workdir)
            .with_timeout(Duration::from_secs(cfg.timeout_secs))
            .with_output_limit(cfg.output_limit_bytes)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_limit(mut self, output_limit_bytes: usize) -> Self {
        self.output_limit_bytes = output_limit_bytes;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a query whose stdout must arrive complete.
    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        if output.stdout_truncated > 0 {
            warn!(
                args = %args.join(" "),
                truncated = output.stdout_truncated,
                "git output over limit"
            );
            return Err(anyhow!(
                "git {} output exceeded {} bytes",
                args.join(" "),
                self.output_limit_bytes
            ));
        }
        Ok(output.stdout_lossy())
    }

    fn run_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.workdir);
        let output = run_with_timeout(cmd, self.timeout, self.output_limit_bytes)
            .map_err(|err| anyhow!("spawn git {}: {err:#}", args.join(" ")))?;
        if output.timed_out {
            return Err(anyhow!(
                "git {} timed out after {:?}",
                args.join(" "),
                self.timeout
            ));
        }
        if !output.status.success() {
            return Err(anyhow!(
                "git {} failed: {}",
                args.join(" "),
                output.stderr_lossy()
            ));
        }
        Ok(output)
    }
}

impl ChangeSource for Git {
    #[instrument(skip_all, fields(workdir = %self.workdir.display()))]
    fn staged_entries(&self) -> Result<Vec<NameStatusEntry>> {
        let out = self.run_capture(&["diff", "--cached", "--name-status", "-z"])?;
        let entries = parse_name_status(&out);
        debug!(count = entries.len(), "staged entries");
        Ok(entries)
    }

    #[instrument(skip_all, fields(path = %path))]
    fn staged_diff(&self, path: &str) -> Result<String> {
        self.run_capture(&["--literal-pathspecs", "diff", "--cached", "--", path])
    }
}
