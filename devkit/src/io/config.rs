//! Server configuration stored in `.devkit/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Tool names accepted in `tools.enabled` and `ENABLE_TOOLS`.
pub const KNOWN_TOOLS: [&str; 2] = ["commit", "codereview"];

/// Environment variable overriding `tools.enabled` (comma-separated).
pub const ENABLE_TOOLS_ENV: &str = "ENABLE_TOOLS";

/// Top-level configuration (TOML).
///
/// Missing fields default to sensible values; a missing file is the default
/// config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DevkitConfig {
    pub git: GitConfig,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitConfig {
    /// Repository to inspect; defaults to the server's working directory.
    pub workdir: Option<PathBuf>,

    /// Wall-clock limit for a single git query, in seconds.
    pub timeout_secs: u64,

    /// Truncate git stdout beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            workdir: None,
            timeout_secs: 30,
            output_limit_bytes: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    /// Tools to expose. Empty means all of [`KNOWN_TOOLS`].
    pub enabled: Vec<String>,
}

impl ToolsConfig {
    pub fn is_enabled(&self, tool: &str) -> bool {
        self.enabled.is_empty() || self.enabled.iter().any(|name| name == tool)
    }
}

impl DevkitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.git.timeout_secs == 0 {
            return Err(anyhow!("git.timeout_secs must be > 0"));
        }
        if self.git.output_limit_bytes == 0 {
            return Err(anyhow!("git.output_limit_bytes must be > 0"));
        }
        if let Some(unknown) = self
            .tools
            .enabled
            .iter()
            .find(|name| !KNOWN_TOOLS.contains(&name.as_str()))
        {
            return Err(anyhow!(
                "unknown tool '{unknown}' in tools.enabled (known: {})",
                KNOWN_TOOLS.join(", ")
            ));
        }
        Ok(())
    }

    /// Replace `tools.enabled` with a comma-separated override, if non-blank.
    pub fn apply_enable_tools(&mut self, raw: Option<&str>) {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return;
        };
        self.tools.enabled = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `DevkitConfig::default()`.
pub fn load_config(path: &Path) -> Result<DevkitConfig> {
    if !path.exists() {
        let cfg = DevkitConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DevkitConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load config and apply the `ENABLE_TOOLS` environment override.
pub fn load_config_with_env(path: &Path) -> Result<DevkitConfig> {
    let mut cfg = load_config(path)?;
    let raw = std::env::var(ENABLE_TOOLS_ENV).ok();
    cfg.apply_enable_tools(raw.as_deref());
    cfg.validate()
        .with_context(|| format!("apply {ENABLE_TOOLS_ENV}"))?;
    Ok(cfg)
}
