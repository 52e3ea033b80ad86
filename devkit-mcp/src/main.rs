//! devkit MCP server: `commit` and `code_review` tools over stdio.

mod server;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use devkit::engine::Engine;
use devkit::io::config::load_config_with_env;
use devkit::io::git::Git;
use tracing::info;

use crate::server::DevkitServer;

#[derive(Parser)]
#[command(name = "devkit-mcp")]
#[command(about = "MCP server for chain-of-thought commit drafting and code review")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = ".devkit/config.toml")]
    config: PathBuf,

    /// Repository to inspect (overrides git.workdir)
    #[arg(long)]
    workdir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    devkit::logging::init();

    let args = Args::parse();
    let mut cfg = load_config_with_env(&args.config)?;
    if let Some(workdir) = args.workdir {
        cfg.git.workdir = Some(workdir);
    }

    let cwd = std::env::current_dir().context("resolve current directory")?;
    let git = Git::from_config(&cfg.git, &cwd);
    info!(
        workdir = %git.workdir().display(),
        timeout = ?git.timeout(),
        tools = ?cfg.tools.enabled,
        "starting devkit-mcp"
    );

    let server = DevkitServer::new(Engine::new(git), &cfg.tools);
    server::serve(server).await
}
